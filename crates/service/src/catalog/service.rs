use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use super::domain::{ProductDetail, ProductPage};
use super::repository::ProductRepository;
use crate::errors::ServiceError;
use crate::pagination::PageRequest;

pub struct CatalogService<R: ProductRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: ProductRepository + ?Sized> CatalogService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Page of products in creation order. Out-of-range pages are empty, not errors.
    #[instrument(skip(self))]
    pub async fn list_products(&self, request: PageRequest) -> Result<ProductPage, ServiceError> {
        let (products, total) = self.repo.list_page(request.index(), request.size()).await?;
        debug!(returned = products.len(), total, "listed products");
        Ok(ProductPage::new(products, request.index(), request.size(), total))
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> Result<ProductDetail, ServiceError> {
        self.repo.find_detail(id).await?.ok_or_else(|| ServiceError::not_found("Product"))
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::product;
    use super::*;
    use crate::catalog::repository::mock::InMemoryProductRepository;

    fn catalog(n: usize) -> (CatalogService<InMemoryProductRepository>, Vec<Uuid>) {
        let repo = Arc::new(InMemoryProductRepository::default());
        let mut ids = Vec::new();
        for i in 0..n {
            let p = product(&format!("p{i}"), &[]);
            ids.push(p.product.id);
            repo.insert(p);
        }
        (CatalogService::new(repo), ids)
    }

    #[tokio::test]
    async fn lists_pages_in_order() {
        let (svc, ids) = catalog(5);
        let first = svc.list_products(PageRequest::new(1, 2)).await.unwrap();
        assert_eq!(first.products.iter().map(|p| p.id).collect::<Vec<_>>(), ids[..2]);
        assert_eq!((first.page, first.per_page, first.total, first.pages), (1, 2, 5, 3));

        let last = svc.list_products(PageRequest::new(3, 2)).await.unwrap();
        assert_eq!(last.products.len(), 1);
        assert_eq!(last.products[0].id, ids[4]);
    }

    #[tokio::test]
    async fn out_of_range_page_is_empty() {
        let (svc, _) = catalog(3);
        let page = svc.list_products(PageRequest::new(9, 20)).await.unwrap();
        assert!(page.products.is_empty());
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn oversized_page_is_clamped() {
        let (svc, _) = catalog(1);
        let page = svc.list_products(PageRequest::new(1, 5000)).await.unwrap();
        assert_eq!(page.per_page, 100);
    }

    #[tokio::test]
    async fn detail_carries_reviews() {
        let repo = Arc::new(InMemoryProductRepository::default());
        let p = product("cam", &[5, 3]);
        let id = p.product.id;
        repo.insert(p);
        let svc = CatalogService::new(repo);

        let detail = svc.get_product(id).await.unwrap();
        assert_eq!(detail.reviews.len(), 2);
        assert_eq!(detail.product.rating, 4.0);
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let (svc, _) = catalog(0);
        let err = svc.get_product(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(&err, ServiceError::NotFound(_)));
        assert_eq!(err.to_string(), "Product not found");
    }
}
