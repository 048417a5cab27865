//! Catalog operations over the fixed collection path.

use std::cell::Cell;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio_stream::{Stream, StreamExt, wrappers::WatchStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::entities::{Entry, EntryId};
use crate::domain::repositories::{CatalogStore, FeedEvent, Snapshot, StoreError};
use crate::error::CatalogError;

/// Path of the catalog collection inside the store.
pub const CATALOG_PATH: &str = "coins";

thread_local! {
    /// Set while this thread runs a listener callback.
    static DELIVERING: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as inside a listener callback until dropped.
struct Delivering;

impl Delivering {
    fn enter() -> Self {
        DELIVERING.set(true);
        Self
    }
}

impl Drop for Delivering {
    fn drop(&mut self) {
        DELIVERING.set(false);
    }
}

/// Handle to a live listener registered with [`CatalogService::subscribe`].
///
/// Once [`Subscription::unsubscribe`] returns, no callback is running and
/// none will start. Calling it again is a no-op. Dropping the handle without
/// unsubscribing leaves the listener attached until the store itself goes
/// away.
#[derive(Debug, Clone)]
pub struct Subscription {
    token: CancellationToken,
    /// Held by the listener for the whole of each callback.
    delivery: Arc<Mutex<()>>,
}

impl Subscription {
    fn new(token: CancellationToken) -> Self {
        Self {
            token,
            delivery: Arc::new(Mutex::new(())),
        }
    }

    /// A handle with no listener behind it.
    fn detached() -> Self {
        let subscription = Self::new(CancellationToken::new());
        subscription.token.cancel();
        subscription
    }

    /// Detaches the listener, waiting for a callback in progress to finish.
    ///
    /// Called from inside a callback it does not wait, since the caller is
    /// the delivery in progress.
    pub fn unsubscribe(&self) {
        let first = !self.token.is_cancelled();
        self.token.cancel();
        if !DELIVERING.get() {
            drop(self.delivery.lock().unwrap_or_else(PoisonError::into_inner));
        }
        if first {
            debug!(path = CATALOG_PATH, "Catalog listener detached");
        }
    }

    /// Returns true while the listener may still deliver snapshots.
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Ties the listener to the returned guard's lifetime.
    pub fn into_guard(self) -> SubscriptionGuard {
        SubscriptionGuard(self)
    }
}

/// Unsubscribes when dropped.
#[derive(Debug)]
pub struct SubscriptionGuard(Subscription);

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.0.unsubscribe();
    }
}

/// One delivery of a live catalog stream.
pub type CatalogUpdate = Result<Vec<Entry>, CatalogError>;

/// A live stream of catalog deliveries that owns its listener.
pub type CatalogUpdates = Pin<Box<dyn Stream<Item = CatalogUpdate> + Send>>;

/// Converts a store snapshot into entries, keeping the store's key order.
pub fn entries_from_snapshot(snapshot: &Snapshot) -> Vec<Entry> {
    snapshot
        .iter()
        .map(|child| Entry::deserialize(child.record.clone(), child.key.clone()))
        .collect()
}

/// Service adapting the real-time store to catalog entries.
///
/// Every operation validates locally before touching the store, and every
/// store failure is wrapped into a descriptive [`CatalogError`].
pub struct CatalogService<S: CatalogStore + ?Sized> {
    store: Arc<S>,
}

impl<S: CatalogStore + ?Sized + 'static> CatalogService<S> {
    /// Creates a new catalog service.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Registers a continuous listener on the collection.
    ///
    /// `on_change` receives the complete list of entries each time anything
    /// in the collection changes, starting with the current contents.
    /// `on_error` receives each store failure once. The listener stays
    /// attached and resumes with the next snapshot once the store recovers.
    ///
    /// If the feed cannot be opened, `on_error` is called immediately and the
    /// returned handle is already detached.
    pub async fn subscribe<F, E>(&self, on_change: F, on_error: E) -> Subscription
    where
        F: Fn(Vec<Entry>) + Send + Sync + 'static,
        E: Fn(CatalogError) + Send + Sync + 'static,
    {
        let mut feed = match self.store.watch().await {
            Ok(feed) => feed,
            Err(e) => {
                error!("Failed to attach catalog listener: {}", e);
                metrics::counter!("catalog_store_errors_total").increment(1);
                on_error(CatalogError::transport(
                    "Error setting up real-time updates",
                    e,
                ));
                return Subscription::detached();
            }
        };

        let subscription = Subscription::new(CancellationToken::new());
        let cancel = subscription.token.clone();
        let delivery = subscription.delivery.clone();

        tokio::spawn(async move {
            loop {
                let event = feed.borrow_and_update().clone();
                {
                    let _delivery = delivery.lock().unwrap_or_else(PoisonError::into_inner);
                    if cancel.is_cancelled() {
                        break;
                    }
                    let _delivering = Delivering::enter();

                    match event {
                        FeedEvent::Snapshot(snapshot) => {
                            let entries = entries_from_snapshot(&snapshot);
                            debug!(count = entries.len(), "Delivering catalog snapshot");
                            on_change(entries);
                        }
                        FeedEvent::Failed(e) => {
                            warn!("Catalog listener error: {}", e);
                            metrics::counter!("catalog_store_errors_total").increment(1);
                            on_error(CatalogError::transport(
                                "Error loading collection in real time",
                                e,
                            ));
                        }
                    }
                }

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    changed = feed.changed() => {
                        if changed.is_err() {
                            debug!("Catalog feed closed");
                            break;
                        }
                    }
                }
            }
        });

        info!(path = CATALOG_PATH, "Catalog listener attached");
        subscription
    }

    /// Subscribes and exposes the deliveries as a stream.
    ///
    /// Only the latest delivery is kept for a slow reader. The listener is
    /// detached when the stream is dropped, which makes this suitable for
    /// per-connection server-sent events.
    pub async fn updates(&self) -> CatalogUpdates {
        let (tx, rx) = watch::channel::<Option<CatalogUpdate>>(None);
        let tx = Arc::new(tx);
        let on_error_tx = tx.clone();

        let guard = self
            .subscribe(
                move |entries| {
                    tx.send_replace(Some(Ok(entries)));
                },
                move |e| {
                    on_error_tx.send_replace(Some(Err(e)));
                },
            )
            .await
            .into_guard();

        Box::pin(WatchStream::new(rx).filter_map(move |update| {
            let _listener = &guard;
            update
        }))
    }

    /// Reads the collection once, bypassing any live listener.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Transport`] if the read fails.
    pub async fn fetch_once(&self) -> Result<Vec<Entry>, CatalogError> {
        let snapshot = self
            .store
            .snapshot()
            .await
            .map_err(|e| self.transport_failure("Error loading collection", e))?;

        Ok(entries_from_snapshot(&snapshot))
    }

    /// Persists a new entry under a freshly generated key.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] without contacting the store if
    /// the entry is invalid. Returns [`CatalogError::Transport`] if the
    /// write fails.
    pub async fn add(&self, entry: &Entry) -> Result<EntryId, CatalogError> {
        ensure_valid(entry)?;

        let key = self.store.push_key();
        self.store
            .set(&key, entry.serialize())
            .await
            .map_err(|e| self.transport_failure("Error adding entry", e))?;

        info!(id = %key, category = %entry.category, "Entry added");
        metrics::counter!("catalog_entries_added_total").increment(1);
        Ok(key)
    }

    /// Overwrites every field of an existing entry except its creation time.
    ///
    /// Updating a key that does not exist is an error; nothing is created.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] without contacting the store if
    /// the entry is invalid. Returns [`CatalogError::NotFound`] if no entry
    /// lives under `id`. Returns [`CatalogError::Transport`] if the write fails.
    pub async fn update(&self, id: &EntryId, entry: &Entry) -> Result<(), CatalogError> {
        ensure_valid(entry)?;

        let mut record = entry.serialize();
        record.created_at = None;

        let existed = self
            .store
            .update(id, record)
            .await
            .map_err(|e| self.transport_failure("Error updating entry", e))?;

        if !existed {
            return Err(CatalogError::not_found(id.as_str()));
        }

        info!(id = %id, "Entry updated");
        metrics::counter!("catalog_entries_updated_total").increment(1);
        Ok(())
    }

    /// Deletes the entry stored under `id`.
    ///
    /// Removing an id that does not exist succeeds without effect.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Transport`] if the delete fails.
    pub async fn remove(&self, id: &EntryId) -> Result<(), CatalogError> {
        let existed = self
            .store
            .remove(id)
            .await
            .map_err(|e| self.transport_failure("Error removing entry", e))?;

        if existed {
            info!(id = %id, "Entry removed");
            metrics::counter!("catalog_entries_removed_total").increment(1);
        } else {
            debug!(id = %id, "Entry already absent, nothing removed");
        }

        Ok(())
    }

    /// Returns whether the underlying store is reachable.
    pub async fn health_check(&self) -> bool {
        self.store.health_check().await
    }

    fn transport_failure(&self, context: &'static str, e: StoreError) -> CatalogError {
        error!("{}: {}", context, e);
        metrics::counter!("catalog_store_errors_total").increment(1);
        CatalogError::transport(context, e)
    }
}

fn ensure_valid(entry: &Entry) -> Result<(), CatalogError> {
    let fields = entry.invalid_fields();
    if fields.is_empty() {
        Ok(())
    } else {
        Err(CatalogError::validation(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::EntryRecord;
    use crate::domain::repositories::{MockCatalogStore, StoredRecord};
    use std::sync::Arc;

    fn silver_dollar() -> Entry {
        Entry::new(
            "Silver Dollar",
            "1921 coin",
            "silver",
            "http://x/y.png",
            26.73,
            1921,
            None,
        )
    }

    #[tokio::test]
    async fn test_add_success_writes_under_push_key() {
        let mut mock_store = MockCatalogStore::new();

        mock_store
            .expect_push_key()
            .times(1)
            .returning(|| EntryId::new("-Nnew"));
        mock_store
            .expect_set()
            .withf(|key, record| key.as_str() == "-Nnew" && record.title == "Silver Dollar")
            .times(1)
            .returning(|_, _| Ok(()));

        let service = CatalogService::new(Arc::new(mock_store));

        let id = service.add(&silver_dollar()).await.unwrap();

        assert_eq!(id.as_str(), "-Nnew");
    }

    #[tokio::test]
    async fn test_add_invalid_never_touches_store() {
        // No expectations: any store call panics.
        let mock_store = MockCatalogStore::new();
        let service = CatalogService::new(Arc::new(mock_store));

        let mut entry = silver_dollar();
        entry.title.clear();

        let result = service.add(&entry).await;

        assert!(matches!(
            result.unwrap_err(),
            CatalogError::Validation { fields } if fields == vec!["title"]
        ));
    }

    #[tokio::test]
    async fn test_add_wraps_store_failure() {
        let mut mock_store = MockCatalogStore::new();

        mock_store
            .expect_push_key()
            .returning(|| EntryId::new("-Nnew"));
        mock_store
            .expect_set()
            .returning(|_, _| Err(StoreError::PermissionDenied("rules".to_string())));

        let service = CatalogService::new(Arc::new(mock_store));

        let err = service.add(&silver_dollar()).await.unwrap_err();

        assert!(matches!(err, CatalogError::Transport { .. }));
        assert_eq!(
            err.to_string(),
            "Error adding entry: permission denied: rules"
        );
    }

    #[tokio::test]
    async fn test_update_sends_record_without_created_at() {
        let mut mock_store = MockCatalogStore::new();

        mock_store
            .expect_update()
            .withf(|key, record| key.as_str() == "k1" && record.created_at.is_none())
            .times(1)
            .returning(|_, _| Ok(true));

        let service = CatalogService::new(Arc::new(mock_store));

        let result = service.update(&EntryId::new("k1"), &silver_dollar()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_update_missing_key_is_not_found() {
        let mut mock_store = MockCatalogStore::new();

        mock_store.expect_update().times(1).returning(|_, _| Ok(false));

        let service = CatalogService::new(Arc::new(mock_store));

        let err = service
            .update(&EntryId::new("ghost"), &silver_dollar())
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::NotFound { id } if id == "ghost"));
    }

    #[tokio::test]
    async fn test_update_invalid_never_touches_store() {
        let mock_store = MockCatalogStore::new();
        let service = CatalogService::new(Arc::new(mock_store));

        let mut entry = silver_dollar();
        entry.weight = -1.0;

        let err = service
            .update(&EntryId::new("k1"), &entry)
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_remove_missing_key_is_noop() {
        let mut mock_store = MockCatalogStore::new();

        mock_store.expect_remove().times(1).returning(|_| Ok(false));

        let service = CatalogService::new(Arc::new(mock_store));

        assert!(service.remove(&EntryId::new("ghost")).await.is_ok());
    }

    #[tokio::test]
    async fn test_remove_wraps_store_failure() {
        let mut mock_store = MockCatalogStore::new();

        mock_store
            .expect_remove()
            .returning(|_| Err(StoreError::Unavailable("offline".to_string())));

        let service = CatalogService::new(Arc::new(mock_store));

        let err = service.remove(&EntryId::new("k1")).await.unwrap_err();

        assert_eq!(err.to_string(), "Error removing entry: store unavailable: offline");
    }

    #[tokio::test]
    async fn test_fetch_once_converts_records() {
        let mut mock_store = MockCatalogStore::new();

        let record: EntryRecord = silver_dollar().serialize();
        mock_store.expect_snapshot().times(1).returning(move || {
            Ok(vec![StoredRecord {
                key: EntryId::new("k1"),
                record: record.clone(),
            }])
        });

        let service = CatalogService::new(Arc::new(mock_store));

        let entries = service.fetch_once().await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, Some(EntryId::new("k1")));
        assert_eq!(entries[0].title, "Silver Dollar");
    }

    #[tokio::test]
    async fn test_fetch_once_wraps_store_failure() {
        let mut mock_store = MockCatalogStore::new();

        mock_store
            .expect_snapshot()
            .returning(|| Err(StoreError::Unavailable("offline".to_string())));

        let service = CatalogService::new(Arc::new(mock_store));

        let err = service.fetch_once().await.unwrap_err();

        assert!(err.to_string().starts_with("Error loading collection"));
    }

    #[tokio::test]
    async fn test_subscribe_failure_reports_once_and_detaches() {
        let mut mock_store = MockCatalogStore::new();

        mock_store
            .expect_watch()
            .times(1)
            .returning(|| Err(StoreError::PermissionDenied("rules".to_string())));

        let service = CatalogService::new(Arc::new(mock_store));
        let errors = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = errors.clone();

        let subscription = service
            .subscribe(
                |_| panic!("no snapshot expected"),
                move |e| sink.lock().unwrap().push(e.to_string()),
            )
            .await;

        assert!(!subscription.is_active());
        let errors = errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("permission denied"));
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let subscription = Subscription::new(CancellationToken::new());

        assert!(subscription.is_active());
        subscription.unsubscribe();
        subscription.unsubscribe();
        assert!(!subscription.is_active());
    }

    #[test]
    fn test_guard_unsubscribes_on_drop() {
        let subscription = Subscription::new(CancellationToken::new());
        let observer = subscription.clone();

        drop(subscription.into_guard());

        assert!(!observer.is_active());
    }
}
