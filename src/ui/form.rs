//! Raw form input and its conversion into entries.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Entry, EntryId};
use crate::error::CatalogError;

/// The six user-editable fields, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryForm {
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: String,
    pub weight: String,
    pub manufacture_year: String,
}

impl EntryForm {
    /// Pre-fills a form with the current values of `entry`.
    pub fn from_entry(entry: &Entry) -> Self {
        Self {
            title: entry.title.clone(),
            description: entry.description.clone(),
            category: entry.category.clone(),
            image: entry.image.clone(),
            weight: entry.weight.to_string(),
            manufacture_year: entry.manufacture_year.to_string(),
        }
    }

    /// Builds an unvalidated entry from the form.
    ///
    /// Text fields are taken as typed. Numbers are parsed after trimming.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] naming each numeric field that
    /// does not parse.
    pub fn into_entry(self, id: Option<EntryId>) -> Result<Entry, CatalogError> {
        let weight = self.weight.trim().parse::<f64>();
        let year = self.manufacture_year.trim().parse::<i64>();

        let (weight, year) = match (weight, year) {
            (Ok(weight), Ok(year)) => (weight, year),
            (weight, year) => {
                let mut fields = Vec::new();
                if weight.is_err() {
                    fields.push("weight");
                }
                if year.is_err() {
                    fields.push("manufactureYear");
                }
                return Err(CatalogError::validation(fields));
            }
        };

        Ok(Entry::new(
            self.title,
            self.description,
            self.category,
            self.image,
            weight,
            year,
            id,
        ))
    }
}
