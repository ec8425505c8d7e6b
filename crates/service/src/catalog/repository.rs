use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::domain::{ProductDetail, ProductView, ReviewView};
use crate::errors::ServiceError;

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// One page (0-based index) plus the total number of products.
    async fn list_page(&self, page_idx: u64, per_page: u64) -> Result<(Vec<ProductView>, u64), ServiceError>;
    async fn find_detail(&self, id: Uuid) -> Result<Option<ProductDetail>, ServiceError>;
}

pub struct SeaOrmProductRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmProductRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait]
impl ProductRepository for SeaOrmProductRepository {
    async fn list_page(&self, page_idx: u64, per_page: u64) -> Result<(Vec<ProductView>, u64), ServiceError> {
        let (rows, total) = models::product::list_page(&self.db, page_idx, per_page).await?;
        Ok((rows.into_iter().map(ProductView::from).collect(), total))
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<ProductDetail>, ServiceError> {
        let found = models::product::find_with_reviews(&self.db, id).await?;
        Ok(found.map(|(product, reviews)| ProductDetail {
            product: product.into(),
            reviews: reviews.into_iter().map(ReviewView::from).collect(),
        }))
    }
}

/// In-memory catalog for tests and local runs without a database
pub mod mock {
    use super::*;
    use std::sync::RwLock;

    #[derive(Default)]
    pub struct InMemoryProductRepository {
        items: RwLock<Vec<ProductDetail>>, // insertion order
    }

    impl InMemoryProductRepository {
        pub fn insert(&self, detail: ProductDetail) {
            if let Ok(mut items) = self.items.write() {
                items.push(detail);
            }
        }
    }

    #[async_trait]
    impl ProductRepository for InMemoryProductRepository {
        async fn list_page(&self, page_idx: u64, per_page: u64) -> Result<(Vec<ProductView>, u64), ServiceError> {
            let items = self.items.read().map_err(|_| ServiceError::Storage("catalog lock poisoned".into()))?;
            let page = items
                .iter()
                .skip((page_idx * per_page) as usize)
                .take(per_page as usize)
                .map(|d| d.product.clone())
                .collect();
            Ok((page, items.len() as u64))
        }

        async fn find_detail(&self, id: Uuid) -> Result<Option<ProductDetail>, ServiceError> {
            let items = self.items.read().map_err(|_| ServiceError::Storage("catalog lock poisoned".into()))?;
            Ok(items.iter().find(|d| d.product.id == id).cloned())
        }
    }
}
