use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use service::auth::domain::Caller;
use service::auth::AuthError;
use tracing::debug;

use crate::cookies::presented_token;
use crate::errors::JsonApiError;
use crate::state::AppState;

/// Verify the presented token and stash the resulting `Caller` in request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let token = presented_token(&state.cookies, &jar, req.headers()).ok_or(AuthError::MissingToken)?;
    let caller = state.accounts.authenticate_token(&token)?;
    debug!(user_id = %caller.id(), "request authenticated");
    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

/// Must run after `require_auth`. Stashes an `AdminCaller` or rejects with 403.
pub async fn require_admin(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response, JsonApiError> {
    let caller = req.extensions().get::<Caller>().copied().ok_or(AuthError::MissingToken)?;
    let admin = state.accounts.authorize_admin(&caller).await?;
    req.extensions_mut().insert(admin);
    Ok(next.run(req).await)
}
