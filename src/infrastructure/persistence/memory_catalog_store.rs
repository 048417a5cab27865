//! In-process implementation of the catalog store.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{RwLock, watch};
use tracing::{debug, info, warn};

use crate::domain::entities::{EntryId, EntryRecord};
use crate::domain::repositories::{
    CatalogStore, FeedEvent, Snapshot, SnapshotFeed, StoreError, StoreResult, StoredRecord,
};
use crate::utils::key_generator::PushKeyGenerator;

/// A catalog store that keeps the collection in memory.
///
/// Used when no database is configured and throughout the test suite. Every
/// mutation publishes the full collection on the live feed, so subscribers
/// behave exactly as they would against a hosted store.
///
/// The store can be taken offline with [`MemoryCatalogStore::set_offline`] to
/// exercise connectivity-loss paths. While offline every operation fails with
/// [`StoreError::Unavailable`] and the feed reports the failure.
pub struct MemoryCatalogStore {
    records: RwLock<BTreeMap<EntryId, EntryRecord>>,
    feed: watch::Sender<FeedEvent>,
    keys: PushKeyGenerator,
    offline: AtomicBool,
}

impl MemoryCatalogStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        info!("Using in-memory catalog store (data is not persisted)");
        let (feed, _) = watch::channel(FeedEvent::Snapshot(Arc::new(Vec::new())));

        Self {
            records: RwLock::new(BTreeMap::new()),
            feed,
            keys: PushKeyGenerator::new(),
            offline: AtomicBool::new(false),
        }
    }

    /// Simulates losing or regaining the connection to the store.
    ///
    /// Going offline publishes a failure on the feed. Coming back online
    /// publishes the current collection.
    pub async fn set_offline(&self, offline: bool) {
        let was_offline = self.offline.swap(offline, Ordering::SeqCst);
        if was_offline == offline {
            return;
        }

        if offline {
            warn!("In-memory catalog store taken offline");
            self.feed.send_replace(FeedEvent::Failed(unavailable()));
        } else {
            info!("In-memory catalog store back online");
            let records = self.records.read().await;
            self.publish(&records);
        }
    }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }

    fn publish(&self, records: &BTreeMap<EntryId, EntryRecord>) {
        let snapshot = to_snapshot(records);
        debug!(children = snapshot.len(), "Publishing catalog snapshot");
        self.feed.send_replace(FeedEvent::Snapshot(Arc::new(snapshot)));
    }
}

impl Default for MemoryCatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

fn unavailable() -> StoreError {
    StoreError::Unavailable("in-memory store is offline".to_string())
}

fn to_snapshot(records: &BTreeMap<EntryId, EntryRecord>) -> Snapshot {
    records
        .iter()
        .map(|(key, record)| StoredRecord {
            key: key.clone(),
            record: record.clone(),
        })
        .collect()
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn snapshot(&self) -> StoreResult<Snapshot> {
        self.ensure_online()?;
        Ok(to_snapshot(&*self.records.read().await))
    }

    fn push_key(&self) -> EntryId {
        self.keys.next_key()
    }

    async fn set(&self, key: &EntryId, record: EntryRecord) -> StoreResult<()> {
        self.ensure_online()?;

        let mut records = self.records.write().await;
        records.insert(key.clone(), record);
        self.publish(&records);

        Ok(())
    }

    async fn update(&self, key: &EntryId, record: EntryRecord) -> StoreResult<bool> {
        self.ensure_online()?;

        let mut records = self.records.write().await;
        let Some(existing) = records.get_mut(key) else {
            return Ok(false);
        };

        let created_at = existing.created_at.or(record.created_at);
        *existing = EntryRecord {
            created_at,
            ..record
        };
        self.publish(&records);

        Ok(true)
    }

    async fn remove(&self, key: &EntryId) -> StoreResult<bool> {
        self.ensure_online()?;

        let mut records = self.records.write().await;
        let removed = records.remove(key).is_some();
        if removed {
            self.publish(&records);
        }

        Ok(removed)
    }

    async fn watch(&self) -> StoreResult<SnapshotFeed> {
        self.ensure_online()?;
        Ok(self.feed.subscribe())
    }

    async fn health_check(&self) -> bool {
        !self.offline.load(Ordering::SeqCst)
    }
}
