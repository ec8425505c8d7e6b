//! One-way password hashing.
//!
//! Argon2id with a random per-call salt; digests are PHC strings so the
//! parameters travel with the hash and verification needs no extra state.

use std::fmt;

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;

use super::errors::AuthError;

pub const ALGORITHM: &str = "argon2id";

#[derive(Clone)]
pub struct PasswordHasher {
    argon: Argon2<'static>,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { argon: Argon2::default() }
    }
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher").field("algorithm", &ALGORITHM).finish()
    }
}

impl PasswordHasher {
    /// Custom cost parameters (memory in KiB, passes, lanes).
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AuthError::Hash(e.to_string()))?;
        Ok(Self { argon: Argon2::new(Algorithm::Argon2id, Version::V0x13, params) })
    }

    /// Salted digest of `plaintext`. Two calls on the same input never return the same string.
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let digest = self
            .argon
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| AuthError::Hash(e.to_string()))?
            .to_string();
        Ok(digest)
    }

    /// Whether `plaintext` is the pre-image of `digest`. A malformed digest is a plain `false`.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => self.argon.verify_password(plaintext.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
pub(crate) fn fast_hasher() -> PasswordHasher {
    PasswordHasher::with_params(1024, 1, 1).expect("valid test params")
}
