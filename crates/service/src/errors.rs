use thiserror::Error;

/// Failures of catalog reads.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Carries the client-facing message, e.g. `Product not found`.
    #[error("{0}")]
    NotFound(String),
    #[error("catalog storage unavailable: {0}")]
    Storage(String),
    #[error("catalog query failed: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{entity} not found")) }
}
