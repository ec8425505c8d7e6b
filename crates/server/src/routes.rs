pub mod products;
pub mod users;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::middleware::{require_admin, require_auth};
use crate::openapi::ApiDoc;
use crate::state::AppState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router, including public, authenticated, and admin routes
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/api/users", post(users::register))
        .route("/api/users/auth", post(users::authenticate))
        .route("/api/users/logout", post(users::logout))
        .route("/api/products", get(products::list_products))
        .route("/api/products/:id", get(products::get_product));

    let authenticated = Router::new()
        .route("/api/users/profile", get(users::get_profile).put(users::update_profile))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // layers run bottom-up: require_auth first, then require_admin
    let admin = Router::new()
        .route("/api/users", get(users::list_users))
        .route(
            "/api/users/:id",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public
        .merge(authenticated)
        .merge(admin)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
