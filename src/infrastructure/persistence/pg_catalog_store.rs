//! PostgreSQL implementation of the catalog store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::entities::{EntryId, EntryRecord};
use crate::domain::repositories::{
    CatalogStore, FeedEvent, Snapshot, SnapshotFeed, StoreError, StoreResult, StoredRecord,
};
use crate::utils::key_generator::PushKeyGenerator;

/// Notification channel fed by the `catalog_items_changed` trigger.
pub const CHANGE_CHANNEL: &str = "catalog_items_changed";

/// Pause before listening again after the listener itself errors.
const LISTENER_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Push keys sort by byte value, not by locale.
const SELECT_ALL: &str = r#"
    SELECT key, title, description, category, image, weight, manufacture_year, created_at
    FROM catalog_items
    ORDER BY key COLLATE "C"
"#;

#[derive(Debug, sqlx::FromRow)]
struct CatalogItemRow {
    key: String,
    title: String,
    description: String,
    category: String,
    image: String,
    weight: f64,
    manufacture_year: i64,
    created_at: Option<DateTime<Utc>>,
}

impl From<CatalogItemRow> for StoredRecord {
    fn from(row: CatalogItemRow) -> Self {
        StoredRecord {
            key: EntryId::new(row.key),
            record: EntryRecord {
                title: row.title,
                description: row.description,
                category: row.category,
                image: row.image,
                weight: row.weight,
                manufacture_year: row.manufacture_year,
                created_at: row.created_at,
            },
        }
    }
}

/// Translates driver errors into store errors.
///
/// `42501` (insufficient_privilege) maps to [`StoreError::PermissionDenied`];
/// connection-level failures map to [`StoreError::Unavailable`].
pub fn map_sqlx_error(e: sqlx::Error) -> StoreError {
    if let Some(db) = e.as_database_error()
        && db.code().as_deref() == Some("42501")
    {
        return StoreError::PermissionDenied(db.message().to_string());
    }

    match &e {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::Unavailable(e.to_string()),
        _ => StoreError::Operation(e.to_string()),
    }
}

async fn load_snapshot(pool: &PgPool) -> StoreResult<Snapshot> {
    let rows = sqlx::query_as::<_, CatalogItemRow>(SELECT_ALL)
        .fetch_all(pool)
        .await
        .map_err(map_sqlx_error)?;

    Ok(rows.into_iter().map(StoredRecord::from).collect())
}

async fn publish_snapshot(pool: &PgPool, feed: &watch::Sender<FeedEvent>) {
    let event = match load_snapshot(pool).await {
        Ok(snapshot) => {
            debug!(children = snapshot.len(), "Publishing catalog snapshot");
            FeedEvent::Snapshot(Arc::new(snapshot))
        }
        Err(e) => {
            error!("Failed to reload catalog snapshot: {}", e);
            FeedEvent::Failed(e)
        }
    };
    feed.send_replace(event);
}

/// Waits for change notifications and republishes the whole collection.
///
/// When the listener connection drops, sqlx reconnects on the next receive.
/// Changes made while disconnected are picked up by reloading right after.
async fn run_change_listener(
    mut listener: PgListener,
    pool: Arc<PgPool>,
    feed: Arc<watch::Sender<FeedEvent>>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Catalog change listener stopped");
                break;
            }
            received = listener.try_recv() => match received {
                Ok(Some(notification)) => {
                    debug!(key = notification.payload(), "Catalog changed");
                    publish_snapshot(&pool, &feed).await;
                }
                Ok(None) => {
                    warn!("Catalog change listener lost its connection, resynchronizing");
                    publish_snapshot(&pool, &feed).await;
                }
                Err(e) => {
                    error!("Catalog change listener failed: {}", e);
                    feed.send_replace(FeedEvent::Failed(map_sqlx_error(e)));
                    tokio::time::sleep(LISTENER_RETRY_DELAY).await;
                }
            }
        }
    }
}

/// PostgreSQL-backed catalog store.
///
/// Records live in `catalog_items`. A trigger sends `NOTIFY` on every change
/// and a background listener republishes the full collection to the live
/// feed. The listener stops when the store is dropped.
pub struct PgCatalogStore {
    pool: Arc<PgPool>,
    keys: PushKeyGenerator,
    feed: Arc<watch::Sender<FeedEvent>>,
    shutdown: CancellationToken,
}

impl PgCatalogStore {
    /// Loads the collection and starts listening for changes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the notification listener cannot be set up.
    /// A failed initial load is not fatal: the feed starts in the failed state.
    pub async fn connect(pool: Arc<PgPool>) -> StoreResult<Self> {
        let mut listener = PgListener::connect_with(pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;
        listener
            .listen(CHANGE_CHANNEL)
            .await
            .map_err(map_sqlx_error)?;

        let initial = match load_snapshot(&pool).await {
            Ok(snapshot) => FeedEvent::Snapshot(Arc::new(snapshot)),
            Err(e) => {
                warn!("Initial catalog load failed: {}", e);
                FeedEvent::Failed(e)
            }
        };
        let (feed, _) = watch::channel(initial);
        let feed = Arc::new(feed);

        let shutdown = CancellationToken::new();
        tokio::spawn(run_change_listener(
            listener,
            pool.clone(),
            feed.clone(),
            shutdown.child_token(),
        ));
        info!("Listening for catalog changes on '{}'", CHANGE_CHANNEL);

        Ok(Self {
            pool,
            keys: PushKeyGenerator::new(),
            feed,
            shutdown,
        })
    }
}

impl Drop for PgCatalogStore {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn snapshot(&self) -> StoreResult<Snapshot> {
        load_snapshot(&self.pool).await
    }

    fn push_key(&self) -> EntryId {
        self.keys.next_key()
    }

    async fn set(&self, key: &EntryId, record: EntryRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO catalog_items
                (key, title, description, category, image, weight, manufacture_year, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (key) DO UPDATE SET
                title            = EXCLUDED.title,
                description      = EXCLUDED.description,
                category         = EXCLUDED.category,
                image            = EXCLUDED.image,
                weight           = EXCLUDED.weight,
                manufacture_year = EXCLUDED.manufacture_year,
                created_at       = EXCLUDED.created_at
            "#,
        )
        .bind(key.as_str())
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.category)
        .bind(&record.image)
        .bind(record.weight)
        .bind(record.manufacture_year)
        .bind(record.created_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update(&self, key: &EntryId, record: EntryRecord) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE catalog_items SET
                title            = $2,
                description      = $3,
                category         = $4,
                image            = $5,
                weight           = $6,
                manufacture_year = $7,
                created_at       = COALESCE(created_at, $8)
            WHERE key = $1
            "#,
        )
        .bind(key.as_str())
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.category)
        .bind(&record.image)
        .bind(record.weight)
        .bind(record.manufacture_year)
        .bind(record.created_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, key: &EntryId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM catalog_items WHERE key = $1")
            .bind(key.as_str())
            .execute(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn watch(&self) -> StoreResult<SnapshotFeed> {
        Ok(self.feed.subscribe())
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
