//! Repository trait definitions for the domain layer.
//!
//! The catalog lives in an external real-time store. This module defines the
//! contract the rest of the crate uses to reach it; backends live in
//! `crate::infrastructure::persistence`.
//!
//! # Available Repositories
//!
//! - [`CatalogStore`] - Keyed reads, writes, and the live snapshot feed
//!
//! # Testing
//!
//! A `mockall` mock is generated for unit tests. Integration tests in
//! `tests/` use [`crate::infrastructure::persistence::MemoryCatalogStore`].

pub mod catalog_store;

pub use catalog_store::{
    CatalogStore, FeedEvent, Snapshot, SnapshotFeed, StoreError, StoreResult, StoredRecord,
};

#[cfg(test)]
pub use catalog_store::MockCatalogStore;
