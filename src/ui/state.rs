//! Explicit view state owned by a single controller or request.

use std::fmt;

use crate::domain::entities::{Entry, EntryId};

/// Which categories the grid shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    /// Every entry, regardless of category.
    #[default]
    All,
    /// Only entries whose category matches exactly (case-sensitive).
    Category(String),
}

impl CategoryFilter {
    /// The sentinel spelling of [`CategoryFilter::All`].
    pub const ALL: &'static str = "all";

    /// Parses user input. `"all"` and the empty string select every entry.
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() || raw == Self::ALL {
            Self::All
        } else {
            Self::Category(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => Self::ALL,
            Self::Category(category) => category,
        }
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        match self {
            Self::All => true,
            Self::Category(category) => entry.category == *category,
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<Option<String>> for CategoryFilter {
    fn from(raw: Option<String>) -> Self {
        raw.as_deref().map(Self::parse).unwrap_or_default()
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The client-side mirror of the catalog.
///
/// `all_entries` is always the last snapshot delivered by the store, replaced
/// wholesale. `filtered_entries` is derived from it and recomputed whenever
/// either the list or the active filter changes.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    all_entries: Vec<Entry>,
    filtered_entries: Vec<Entry>,
    active_category: CategoryFilter,
    entry_being_edited: Option<Entry>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty state with `filter` already active.
    pub fn with_filter(filter: CategoryFilter) -> Self {
        Self {
            active_category: filter,
            ..Self::default()
        }
    }

    pub fn all_entries(&self) -> &[Entry] {
        &self.all_entries
    }

    pub fn filtered_entries(&self) -> &[Entry] {
        &self.filtered_entries
    }

    pub fn active_category(&self) -> &CategoryFilter {
        &self.active_category
    }

    pub fn entry_being_edited(&self) -> Option<&Entry> {
        self.entry_being_edited.as_ref()
    }

    /// Sets the active filter and recomputes the visible subset in list order.
    pub fn apply_filter(&mut self, filter: CategoryFilter) {
        self.active_category = filter;
        self.refilter();
    }

    /// Replaces the whole list with a new snapshot, keeping the active filter.
    pub fn replace_entries(&mut self, entries: Vec<Entry>) {
        self.all_entries = entries;
        self.refilter();
    }

    pub fn find(&self, id: &EntryId) -> Option<&Entry> {
        self.all_entries
            .iter()
            .find(|entry| entry.id.as_ref() == Some(id))
    }

    pub fn begin_edit(&mut self, entry: Entry) {
        self.entry_being_edited = Some(entry);
    }

    pub fn end_edit(&mut self) -> Option<Entry> {
        self.entry_being_edited.take()
    }

    fn refilter(&mut self) {
        self.filtered_entries = self
            .all_entries
            .iter()
            .filter(|entry| self.active_category.matches(entry))
            .cloned()
            .collect();
    }
}
