//! Service layer providing the account lifecycle and catalog reads on top of models.
//! - Separates business logic from data access behind repository traits.
//! - Reuses validation and entity definitions in `models` crate.
//! - Framework-independent: no HTTP types cross this boundary.

pub mod errors;
pub mod auth;
pub mod catalog;
pub mod pagination;
#[cfg(test)]
pub mod test_support;
