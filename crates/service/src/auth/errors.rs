use models::errors::ModelError;
use thiserror::Error;

/// Business errors for the account lifecycle.
///
/// Display strings are client-facing; infrastructure variants carry detail
/// meant for logs only.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Min 8 chars for password, upper, lower, number and symbol")]
    WeakPassword,
    #[error("Invalid email")]
    InvalidEmail,
    #[error("Invalid user data: {0}")]
    InvalidRecord(String),
    #[error("User already exists")]
    DuplicateEmail,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Not authorized, no token")]
    MissingToken,
    #[error("Not authorized, token failed")]
    NotAuthenticated,
    #[error("Not authorized as admin")]
    Forbidden,
    #[error("User not found")]
    NotFound,
    #[error("Can not delete admin user")]
    CannotDeleteAdmin,
    #[error("hashing error: {0}")]
    Hash(String),
    #[error("token error: {0}")]
    Token(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::WeakPassword => 1001,
            AuthError::InvalidEmail => 1002,
            AuthError::InvalidRecord(_) => 1003,
            AuthError::DuplicateEmail => 1004,
            AuthError::InvalidCredentials => 1005,
            AuthError::MissingToken => 1006,
            AuthError::NotAuthenticated => 1007,
            AuthError::Forbidden => 1008,
            AuthError::NotFound => 1009,
            AuthError::CannotDeleteAdmin => 1010,
            AuthError::Hash(_) => 1101,
            AuthError::Token(_) => 1102,
            AuthError::Repository(_) => 1200,
        }
    }

    /// True for failures caused by infrastructure rather than the request.
    pub fn is_internal(&self) -> bool {
        matches!(self, AuthError::Hash(_) | AuthError::Token(_) | AuthError::Repository(_))
    }
}

impl From<ModelError> for AuthError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Validation(msg) => AuthError::InvalidRecord(msg),
            ModelError::Conflict(_) => AuthError::DuplicateEmail,
            ModelError::Db(msg) => AuthError::Repository(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_becomes_duplicate_email() {
        let err: AuthError = ModelError::Conflict("user_email_key".into()).into();
        assert!(matches!(err, AuthError::DuplicateEmail));
        assert_eq!(err.to_string(), "User already exists");
    }

    #[test]
    fn codes_are_distinct() {
        let all = [
            AuthError::WeakPassword,
            AuthError::InvalidEmail,
            AuthError::InvalidRecord(String::new()),
            AuthError::DuplicateEmail,
            AuthError::InvalidCredentials,
            AuthError::MissingToken,
            AuthError::NotAuthenticated,
            AuthError::Forbidden,
            AuthError::NotFound,
            AuthError::CannotDeleteAdmin,
            AuthError::Hash(String::new()),
            AuthError::Token(String::new()),
            AuthError::Repository(String::new()),
        ];
        let mut codes: Vec<u16> = all.iter().map(AuthError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }
}
