use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use service::auth::domain::SessionToken;
use time::OffsetDateTime;

use crate::state::CookieSettings;

/// HTTP-only, same-site-strict cookie carrying the session token.
pub fn session_cookie(settings: &CookieSettings, token: &SessionToken) -> Cookie<'static> {
    Cookie::build((settings.name.clone(), token.value.clone()))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(settings.secure)
        .path("/")
        .max_age(settings.max_age)
        .build()
}

/// Empty value, already expired.
pub fn clear_cookie(settings: &CookieSettings) -> Cookie<'static> {
    Cookie::build((settings.name.clone(), String::new()))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(settings.secure)
        .path("/")
        .max_age(time::Duration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build()
}

/// Token from the session cookie, else from an `Authorization: Bearer` header.
pub fn presented_token(settings: &CookieSettings, jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(c) = jar.get(&settings.name) {
        if !c.value().is_empty() {
            return Some(c.value().to_string());
        }
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
