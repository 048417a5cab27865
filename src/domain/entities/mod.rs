//! Core domain entities representing the catalog data model.
//!
//! Entities are plain data with the invariants that guard what may be
//! persisted. Every entity carries unit tests for its construction rules.
//!
//! # Entity Types
//!
//! - [`Entry`] - One catalog item (a coin)
//! - [`EntryRecord`] - The wire shape an entry takes inside the store
//! - [`EntryId`] - The store-generated key an entry lives under

pub mod entry;

pub use entry::{Entry, EntryId, EntryRecord};
