use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct MessageDoc { pub message: String }

#[derive(ToSchema)]
pub struct RegisterRequest { pub name: String, pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserUpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    /// Omitted means `false`.
    pub is_admin: Option<bool>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDoc {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummaryDoc {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDoc {
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

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDoc {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Product fields at the top level plus `reviews`.
#[derive(Serialize, ToSchema)]
pub struct ProductDetailDoc {
    #[serde(flatten)]
    pub product: ProductDoc,
    pub reviews: Vec<ReviewDoc>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPageDoc {
    pub products: Vec<ProductDoc>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub pages: u64,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::users::register,
        crate::routes::users::authenticate,
        crate::routes::users::logout,
        crate::routes::users::get_profile,
        crate::routes::users::update_profile,
        crate::routes::users::list_users,
        crate::routes::users::get_user,
        crate::routes::users::update_user,
        crate::routes::users::delete_user,
        crate::routes::products::list_products,
        crate::routes::products::get_product,
    ),
    components(
        schemas(
            HealthResponse,
            MessageDoc,
            RegisterRequest,
            LoginRequest,
            ProfileUpdateRequest,
            AdminUserUpdateRequest,
            ProfileDoc,
            UserSummaryDoc,
            ProductDoc,
            ReviewDoc,
            ProductDetailDoc,
            ProductPageDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "users"),
        (name = "admin"),
        (name = "products")
    )
)]
pub struct ApiDoc;
