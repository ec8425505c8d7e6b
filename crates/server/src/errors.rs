use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::Message;
use service::auth::AuthError;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Error rendered as `{"message": ...}` with the matching status code.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    fn internal(detail: &dyn std::fmt::Display) -> Self {
        error!(error = %detail, "internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(Message::new(self.message))).into_response()
    }
}

impl From<AuthError> for JsonApiError {
    fn from(err: AuthError) -> Self {
        let status = match &err {
            AuthError::WeakPassword
            | AuthError::InvalidEmail
            | AuthError::InvalidRecord(_)
            | AuthError::DuplicateEmail
            | AuthError::CannotDeleteAdmin => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials | AuthError::MissingToken | AuthError::NotAuthenticated => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::Hash(_) | AuthError::Token(_) | AuthError::Repository(_) => {
                error!(code = err.code(), "account operation failed");
                return Self::internal(&err);
            }
        };
        Self::new(status, err.to_string())
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, msg),
            other => Self::internal(&other),
        }
    }
}

/// Every body rejection surfaces as 400, whatever status axum picked.
impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(status = %rejection.status(), error = %rejection.body_text(), "rejected request body");
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<PathRejection> for JsonApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<QueryRejection> for JsonApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("bootstrap admin failed: {0}")]
    Bootstrap(#[from] AuthError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
