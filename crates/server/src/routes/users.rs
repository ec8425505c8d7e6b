use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Json};
use axum_extra::extract::cookie::CookieJar;
use common::types::Message;
use service::auth::domain::{
    AdminCaller, AdminUserUpdate, Caller, LoginInput, ProfileUpdate, PublicProfile, RegisterInput, UserSummary,
};
use tracing::info;
use uuid::Uuid;

use crate::cookies::{clear_cookie, presented_token, session_cookie};
use crate::errors::JsonApiError;
use crate::state::AppState;

#[utoipa::path(
    post, path = "/api/users/auth", tag = "users",
    request_body = crate::openapi::LoginRequest,
    responses(
        (status = 200, description = "Authenticated; session cookie set", body = crate::openapi::ProfileDoc),
        (status = 401, description = "Invalid email or password", body = crate::openapi::MessageDoc)
    )
)]
pub async fn authenticate(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LoginInput>, JsonRejection>,
) -> Result<(CookieJar, Json<PublicProfile>), JsonApiError> {
    let Json(input) = body?;
    let session = state.accounts.authenticate(input).await?;
    let jar = jar.add(session_cookie(&state.cookies, &session.token));
    Ok((jar, Json(session.profile)))
}

#[utoipa::path(
    post, path = "/api/users", tag = "users",
    request_body = crate::openapi::RegisterRequest,
    responses(
        (status = 201, description = "Registered; session cookie set", body = crate::openapi::ProfileDoc),
        (status = 400, description = "Invalid input or email taken", body = crate::openapi::MessageDoc)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<RegisterInput>, JsonRejection>,
) -> Result<(StatusCode, CookieJar, Json<PublicProfile>), JsonApiError> {
    let Json(input) = body?;
    let session = state.accounts.register(input).await?;
    let jar = jar.add(session_cookie(&state.cookies, &session.token));
    Ok((StatusCode::CREATED, jar, Json(session.profile)))
}

#[utoipa::path(
    post, path = "/api/users/logout", tag = "users",
    responses((status = 200, description = "Cookie cleared", body = crate::openapi::MessageDoc))
)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar, headers: HeaderMap) -> (CookieJar, Json<Message>) {
    let token = presented_token(&state.cookies, &jar, &headers);
    state.accounts.logout(token.as_deref());
    (jar.add(clear_cookie(&state.cookies)), Json(Message::new("User logged out")))
}

#[utoipa::path(
    get, path = "/api/users/profile", tag = "users",
    responses(
        (status = 200, description = "Own profile", body = crate::openapi::ProfileDoc),
        (status = 401, description = "Not authenticated", body = crate::openapi::MessageDoc),
        (status = 404, description = "User not found", body = crate::openapi::MessageDoc)
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<PublicProfile>, JsonApiError> {
    Ok(Json(state.accounts.get_profile(&caller).await?))
}

#[utoipa::path(
    put, path = "/api/users/profile", tag = "users",
    request_body = crate::openapi::ProfileUpdateRequest,
    responses(
        (status = 200, description = "Updated profile", body = crate::openapi::ProfileDoc),
        (status = 400, description = "Invalid input", body = crate::openapi::MessageDoc),
        (status = 404, description = "User not found", body = crate::openapi::MessageDoc)
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    body: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<PublicProfile>, JsonApiError> {
    let Json(update) = body?;
    Ok(Json(state.accounts.update_profile(&caller, update).await?))
}

#[utoipa::path(
    get, path = "/api/users", tag = "admin",
    responses(
        (status = 200, description = "All users", body = [crate::openapi::UserSummaryDoc]),
        (status = 403, description = "Not an administrator", body = crate::openapi::MessageDoc)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminCaller>,
) -> Result<Json<Vec<UserSummary>>, JsonApiError> {
    Ok(Json(state.accounts.list_users(&admin).await?))
}

#[utoipa::path(
    get, path = "/api/users/{id}", tag = "admin",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = crate::openapi::UserSummaryDoc),
        (status = 404, description = "User not found", body = crate::openapi::MessageDoc)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminCaller>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<UserSummary>, JsonApiError> {
    let Path(id) = id?;
    Ok(Json(state.accounts.get_user_by_id(&admin, id).await?))
}

#[utoipa::path(
    put, path = "/api/users/{id}", tag = "admin",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = crate::openapi::AdminUserUpdateRequest,
    responses(
        (status = 200, description = "Updated user", body = crate::openapi::ProfileDoc),
        (status = 400, description = "Invalid input", body = crate::openapi::MessageDoc),
        (status = 404, description = "User not found", body = crate::openapi::MessageDoc)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminCaller>,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<AdminUserUpdate>, JsonRejection>,
) -> Result<Json<PublicProfile>, JsonApiError> {
    let Path(id) = id?;
    let Json(update) = body?;
    Ok(Json(state.accounts.update_user(&admin, id, update).await?))
}

#[utoipa::path(
    delete, path = "/api/users/{id}", tag = "admin",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Removed", body = crate::openapi::MessageDoc),
        (status = 400, description = "Target is an administrator", body = crate::openapi::MessageDoc),
        (status = 404, description = "User not found", body = crate::openapi::MessageDoc)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminCaller>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Message>, JsonApiError> {
    let Path(id) = id?;
    state.accounts.delete_user(&admin, id).await?;
    info!(admin = %admin.email(), target_id = %id, "admin removed user");
    Ok(Json(Message::new("User removed successfully")))
}
