//! DTOs for the catalog entry endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::{Entry, EntryId};

/// Request body for `POST /api/entries` and `PUT /api/entries/{id}`.
///
/// Field names match the stored record.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EntryRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,

    #[validate(length(min = 1, message = "Image is required"))]
    pub image: String,

    /// Weight in grams.
    #[validate(range(min = 0.0, message = "Weight must not be negative"))]
    pub weight: f64,

    #[validate(range(min = 0, message = "Manufacture year must not be negative"))]
    pub manufacture_year: i64,
}

impl EntryRequest {
    pub fn into_entry(self, id: Option<EntryId>) -> Entry {
        Entry::new(
            self.title,
            self.description,
            self.category,
            self.image,
            self.weight,
            self.manufacture_year,
            id,
        )
    }
}

/// One entry as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryResponse {
    pub id: Option<EntryId>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: String,
    pub weight: f64,
    pub manufacture_year: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Entry> for EntryResponse {
    fn from(entry: Entry) -> Self {
        Self {
            id: entry.id,
            title: entry.title,
            description: entry.description,
            category: entry.category,
            image: entry.image,
            weight: entry.weight,
            manufacture_year: entry.manufacture_year,
            created_at: entry.created_at,
        }
    }
}

/// Response body for `POST /api/entries`.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: EntryId,
}

/// Query parameters for listing and streaming entries.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    /// A category name, or `all`. Absent means `all`.
    pub category: Option<String>,
}
