//! Shared state injected into every handler.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::CatalogService;
use crate::config::DEFAULT_NOTIFY_DISMISS_SECS;
use crate::domain::repositories::CatalogStore;

#[derive(Clone)]
pub struct AppState {
    pub catalog_service: Arc<CatalogService<dyn CatalogStore>>,
    /// How long the dashboard keeps a notification banner visible.
    pub notify_dismiss: Duration,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            catalog_service: Arc::new(CatalogService::new(store)),
            notify_dismiss: Duration::from_secs(DEFAULT_NOTIFY_DISMISS_SECS),
        }
    }

    pub fn with_notify_dismiss(mut self, notify_dismiss: Duration) -> Self {
        self.notify_dismiss = notify_dismiss;
        self
    }
}
