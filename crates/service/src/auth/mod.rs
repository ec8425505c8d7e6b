//! Auth module: account lifecycle in layers (domain, repository, service)
//! plus the two primitives it orchestrates.
//!
//! - `password`: salted one-way hashing and verification
//! - `token`: signed, expiring session tokens
//! - `validation`: input policy (password strength, email and name format)
//! - `service`: registration, authentication, profile and admin operations

pub mod domain;
pub mod errors;
pub mod password;
pub mod repository;
pub mod repo;
pub mod service;
pub mod token;
pub mod validation;

pub use errors::AuthError;
pub use password::PasswordHasher;
pub use service::AccountService;
pub use token::TokenIssuer;
