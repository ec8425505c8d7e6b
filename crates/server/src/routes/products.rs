use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use service::catalog::domain::{ProductDetail, ProductPage};
use service::pagination::PageRequest;
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 1-based page number (default 1)
    pub page: Option<u32>,
    /// Items per page, 1..=100 (default 20)
    pub per_page: Option<u32>,
}

impl ListQuery {
    fn page_request(&self) -> PageRequest {
        PageRequest::from_query(self.page, self.per_page)
    }
}

#[utoipa::path(
    get, path = "/api/products", tag = "products",
    params(ListQuery),
    responses((status = 200, description = "One page of products", body = crate::openapi::ProductPageDoc))
)]
pub async fn list_products(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ProductPage>, JsonApiError> {
    let Query(q) = query?;
    Ok(Json(state.catalog.list_products(q.page_request()).await?))
}

#[utoipa::path(
    get, path = "/api/products/{id}", tag = "products",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product with reviews", body = crate::openapi::ProductDetailDoc),
        (status = 404, description = "Product not found", body = crate::openapi::MessageDoc)
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ProductDetail>, JsonApiError> {
    let Path(id) = id?;
    Ok(Json(state.catalog.get_product(id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_maps_onto_page_request() {
        assert_eq!(ListQuery::default().page_request(), PageRequest::default());
        let req = ListQuery { page: Some(3), per_page: Some(5) }.page_request();
        assert_eq!((req.page(), req.per_page()), (3, 5));
        let req = ListQuery { page: None, per_page: Some(500) }.page_request();
        assert_eq!((req.page(), req.per_page()), (1, 100));
    }
}
