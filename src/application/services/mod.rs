//! Business logic services for the application layer.

pub mod catalog_service;

pub use catalog_service::{
    CATALOG_PATH, CatalogService, CatalogUpdate, CatalogUpdates, Subscription, SubscriptionGuard,
    entries_from_snapshot,
};
