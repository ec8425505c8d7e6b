//! Read-only product catalog: paged listing and detail with reviews.

pub mod domain;
pub mod repository;
pub mod service;

pub use service::CatalogService;
