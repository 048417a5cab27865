//! Catalog entry entity and its stored record shape.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a persisted entry.
///
/// This is the store-generated key the record lives under. It is carried
/// next to the record, never inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntryId {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for EntryId {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// Persistable projection of an [`Entry`], exactly as it sits in the store.
///
/// `created_at` is optional so records written by older clients, and merge
/// updates that must not touch the creation time, are both representable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRecord {
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: String,
    pub weight: f64,
    pub manufacture_year: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One item of the coin catalog.
///
/// Entries are created client-side without an id and gain one when the store
/// accepts them. `created_at` never changes after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub id: Option<EntryId>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: String,
    /// Weight in grams.
    pub weight: f64,
    pub manufacture_year: i64,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// Creates a new entry stamped with the current time.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        image: impl Into<String>,
        weight: f64,
        manufacture_year: i64,
        id: Option<EntryId>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            category: category.into(),
            image: image.into(),
            weight,
            manufacture_year,
            created_at: now(),
        }
    }

    /// Returns true when the entry may be persisted.
    pub fn validate(&self) -> bool {
        self.invalid_fields().is_empty()
    }

    /// Lists the wire names of every field that breaks an invariant.
    ///
    /// A NaN or infinite weight is reported as invalid.
    pub fn invalid_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();

        if self.title.is_empty() {
            fields.push("title");
        }
        if self.description.is_empty() {
            fields.push("description");
        }
        if self.category.is_empty() {
            fields.push("category");
        }
        if self.image.is_empty() {
            fields.push("image");
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            fields.push("weight");
        }
        if self.manufacture_year < 0 {
            fields.push("manufactureYear");
        }

        fields
    }

    /// Projects the persistable fields. The id is not part of the record.
    pub fn serialize(&self) -> EntryRecord {
        EntryRecord {
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            image: self.image.clone(),
            weight: self.weight,
            manufacture_year: self.manufacture_year,
            created_at: Some(self.created_at),
        }
    }

    /// Rebuilds an entry from a stored record and the key it lives under.
    ///
    /// Records without `createdAt` get the current time.
    pub fn deserialize(record: EntryRecord, id: EntryId) -> Self {
        Self {
            id: Some(id),
            title: record.title,
            description: record.description,
            category: record.category,
            image: record.image,
            weight: record.weight,
            manufacture_year: record.manufacture_year,
            created_at: record.created_at.unwrap_or_else(now),
        }
    }

    /// Returns a copy carrying `id` and `created_at` from `original`.
    ///
    /// Used when an edit form produces a fresh entry that replaces a stored one.
    pub fn preserving_identity_of(mut self, original: &Entry) -> Self {
        self.id = original.id.clone();
        self.created_at = original.created_at;
        self
    }
}

/// Timestamps are kept at millisecond precision so they survive every backend
/// unchanged.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
