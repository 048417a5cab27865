//! Application layer services implementing catalog operations.
//!
//! Services consume the store trait and give HTTP handlers, the web
//! dashboard, and the UI controller a single API that validates input and
//! wraps every store failure.
//!
//! # Available Services
//!
//! - [`services::catalog_service::CatalogService`] - Live subscription and CRUD over the `coins` collection

pub mod services;
