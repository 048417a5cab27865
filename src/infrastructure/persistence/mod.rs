//! Catalog store backends.
//!
//! Concrete implementations of [`crate::domain::repositories::CatalogStore`].
//!
//! # Stores
//!
//! - [`MemoryCatalogStore`] - In-process collection with a live feed
//! - [`PgCatalogStore`] - PostgreSQL table with `LISTEN/NOTIFY` change feed

pub mod memory_catalog_store;
pub mod pg_catalog_store;

pub use memory_catalog_store::MemoryCatalogStore;
pub use pg_catalog_store::PgCatalogStore;
