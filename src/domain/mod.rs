//! Domain layer containing the catalog model and the store contract.
//!
//! The domain has no dependencies on infrastructure or presentation layers.
//!
//! # Architecture
//!
//! - [`entities`] - Catalog entries and their stored record shape
//! - [`repositories`] - The real-time store contract
//!
//! # Synchronization Flow
//!
//! 1. A client writes through [`crate::application::services::CatalogService`]
//! 2. The store applies the write and publishes a new [`repositories::FeedEvent`]
//! 3. Every live subscription receives the full collection again
//! 4. Each controller replaces its local list and re-renders

pub mod entities;
pub mod repositories;
