use models::user;

use super::errors::AuthError;

pub const MIN_PASSWORD_LEN: usize = 8;

/// At least 8 characters with an uppercase letter, a lowercase letter, a digit and a symbol.
pub fn check_password_strength(password: &str) -> Result<(), AuthError> {
    let long_enough = password.chars().count() >= MIN_PASSWORD_LEN;
    let upper = password.chars().any(char::is_uppercase);
    let lower = password.chars().any(char::is_lowercase);
    let digit = password.chars().any(|c| c.is_ascii_digit());
    let symbol = password.chars().any(|c| !c.is_alphanumeric() && !c.is_control());
    if long_enough && upper && lower && digit && symbol {
        Ok(())
    } else {
        Err(AuthError::WeakPassword)
    }
}

/// Emails are compared case-insensitively; store them trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn check_email(email: &str) -> Result<(), AuthError> {
    user::validate_email(email).map_err(|_| AuthError::InvalidEmail)
}

pub fn check_name(name: &str) -> Result<(), AuthError> {
    user::validate_name(name).map_err(AuthError::from)
}

/// `Some(value)` for a present, non-blank field; blank strings count as absent.
pub(crate) fn provided(field: Option<&str>) -> Option<&str> {
    field.map(str::trim).filter(|s| !s.is_empty())
}
