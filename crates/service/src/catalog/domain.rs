use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub image: String,
    pub brand: String,
    pub category: String,
    pub description: String,
    pub price: Decimal,
    pub rating: f64,
    pub num_reviews: i32,
    pub count_in_stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<models::product::Model> for ProductView {
    fn from(m: models::product::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            name: m.name,
            image: m.image,
            brand: m.brand,
            category: m.category,
            description: m.description,
            price: m.price,
            rating: m.rating,
            num_reviews: m.num_reviews,
            count_in_stock: m.count_in_stock,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<models::review::Model> for ReviewView {
    fn from(m: models::review::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            name: m.name,
            rating: m.rating,
            comment: m.comment,
            created_at: m.created_at.with_timezone(&Utc),
        }
    }
}

/// Product fields at the top level plus its reviews, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: ProductView,
    pub reviews: Vec<ReviewView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<ProductView>,
    /// 1-based
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub pages: u64,
}

impl ProductPage {
    pub fn new(products: Vec<ProductView>, page_idx: u64, per_page: u64, total: u64) -> Self {
        let pages = total.div_ceil(per_page.max(1));
        Self { products, page: page_idx + 1, per_page, total, pages }
    }
}
