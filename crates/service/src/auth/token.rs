//! Signed, time-bounded session tokens (HS256 JWT).
//!
//! Nothing is persisted server-side: a token is valid iff its signature
//! checks out against the process-wide key and its expiry is in the future.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::domain::SessionToken;
use super::errors::AuthError;

pub const DEFAULT_TTL_DAYS: i64 = 30;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Build from the signing key loaded at startup.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn with_default_ttl(secret: &[u8]) -> Self {
        Self::new(secret, Duration::days(DEFAULT_TTL_DAYS))
    }

    pub fn ttl(&self) -> Duration { self.ttl }

    pub fn issue(&self, user_id: Uuid) -> Result<SessionToken, AuthError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue as if the current time were `issued_at`.
    pub fn issue_at(&self, user_id: Uuid, issued_at: DateTime<Utc>) -> Result<SessionToken, AuthError> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::Token("token expiry out of range".into()))?;
        let claims = Claims { sub: user_id.to_string(), iat: issued_at.timestamp(), exp: expires_at.timestamp() };
        let value = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Token(e.to_string()))?;
        Ok(SessionToken { value, expires_at })
    }

    /// The embedded user id, or `None` for any bad signature, malformed token or past expiry.
    pub fn verify(&self, token: &str) -> Option<Uuid> {
        match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Uuid::parse_str(&data.claims.sub).ok(),
            Err(e) => {
                debug!(err = %e, "token rejected");
                None
            }
        }
    }
}
