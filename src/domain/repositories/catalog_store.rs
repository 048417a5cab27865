//! Contract for the real-time document store holding the catalog collection.

use crate::domain::entities::{EntryId, EntryRecord};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

/// Failures reported by a store backend.
///
/// These never reach callers of the catalog service directly; the service
/// wraps them into [`crate::error::CatalogError::Transport`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store operation failed: {0}")]
    Operation(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// One child of the collection: the key and the record stored under it.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub key: EntryId,
    pub record: EntryRecord,
}

/// The complete contents of the collection at one point in time, in key order.
pub type Snapshot = Vec<StoredRecord>;

/// The latest state a live feed has to report.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// The collection as it stands now. Supersedes every earlier snapshot.
    Snapshot(Arc<Snapshot>),
    /// The store lost the ability to deliver snapshots.
    Failed(StoreError),
}

/// A live view of the collection.
///
/// The receiver always holds the most recent [`FeedEvent`]; intermediate
/// values a slow reader misses are dropped. The feed closes when the store
/// is dropped.
pub type SnapshotFeed = watch::Receiver<FeedEvent>;

/// Repository interface for the catalog collection.
///
/// Mirrors what a hosted real-time database offers for a single path:
/// whole-collection reads, client-side push keys, keyed writes, and a
/// continuous change feed that always delivers the entire collection.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryCatalogStore`] - In-process store
/// - [`crate::infrastructure::persistence::PgCatalogStore`] - PostgreSQL with `LISTEN/NOTIFY`
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Reads the whole collection once.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the read fails.
    async fn snapshot(&self) -> StoreResult<Snapshot>;

    /// Generates a fresh unique key for a new child.
    ///
    /// Keys are generated locally and sort in creation order.
    fn push_key(&self) -> EntryId;

    /// Writes `record` under `key`, replacing whatever was there.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails.
    async fn set(&self, key: &EntryId, record: EntryRecord) -> StoreResult<()>;

    /// Merges `record` into the existing child at `key`.
    ///
    /// Every text and numeric field is overwritten. `created_at` is only
    /// written when the stored record has none.
    ///
    /// Returns `Ok(false)` if no child exists at `key`; nothing is created.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails.
    async fn update(&self, key: &EntryId, record: EntryRecord) -> StoreResult<bool>;

    /// Deletes the child at `key`.
    ///
    /// Returns `Ok(false)` if the key did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the delete fails.
    async fn remove(&self, key: &EntryId) -> StoreResult<bool>;

    /// Opens a live feed of the collection.
    ///
    /// The returned receiver already holds the current state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the feed cannot be established.
    async fn watch(&self) -> StoreResult<SnapshotFeed>;

    /// Checks whether the backend is reachable.
    async fn health_check(&self) -> bool;
}
