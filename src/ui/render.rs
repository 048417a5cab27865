//! Pure rendering from entries to a toolkit-independent card description.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::state::CategoryFilter;
use crate::domain::entities::Entry;

/// One card of the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    /// Store key, used by the edit and remove affordances.
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: String,
    pub weight: f64,
    pub manufacture_year: i64,
    pub created_at: DateTime<Utc>,
}

impl Card {
    /// Weight formatted for display, e.g. `26.73g`.
    pub fn weight_label(&self) -> String {
        format!("{}g", self.weight)
    }
}

impl From<&Entry> for Card {
    fn from(entry: &Entry) -> Self {
        Self {
            id: entry.id.as_ref().map(ToString::to_string).unwrap_or_default(),
            title: entry.title.clone(),
            description: entry.description.clone(),
            category: entry.category.clone(),
            image: entry.image.clone(),
            weight: entry.weight,
            manufacture_year: entry.manufacture_year,
            created_at: entry.created_at,
        }
    }
}

/// The grid as it should appear. An empty grid shows the empty-state message.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CardGrid {
    pub cards: Vec<Card>,
}

impl CardGrid {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }
}

/// One button of the filter bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterButton {
    /// Value sent back when the button is chosen.
    pub category: String,
    pub label: String,
    pub active: bool,
}

/// Builds one card per entry, in list order.
pub fn render_grid(entries: &[Entry]) -> CardGrid {
    CardGrid {
        cards: entries.iter().map(Card::from).collect(),
    }
}

/// Builds the filter bar.
///
/// The bar starts with `all`, followed by each distinct category in order of
/// first appearance. An active category with no entries still gets a button.
/// Exactly one button is active.
pub fn filter_buttons(all_entries: &[Entry], active: &CategoryFilter) -> Vec<FilterButton> {
    let mut categories: Vec<&str> = Vec::new();
    for entry in all_entries {
        if !categories.contains(&entry.category.as_str()) {
            categories.push(&entry.category);
        }
    }
    if let CategoryFilter::Category(category) = active
        && !categories.contains(&category.as_str())
    {
        categories.push(category);
    }

    let mut buttons = Vec::with_capacity(categories.len() + 1);
    buttons.push(FilterButton {
        category: CategoryFilter::ALL.to_string(),
        label: "All".to_string(),
        active: *active == CategoryFilter::All,
    });
    buttons.extend(categories.into_iter().map(|category| FilterButton {
        category: category.to_string(),
        label: category.to_string(),
        active: active.as_str() == category && *active != CategoryFilter::All,
    }));

    buttons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::EntryId;

    fn coin(key: &str, title: &str, category: &str) -> Entry {
        let mut entry = Entry::new(title, "desc", category, "http://x/c.png", 8.0, 1900, None);
        entry.id = Some(EntryId::new(key));
        entry
    }

    #[test]
    fn test_render_grid_keeps_order() {
        let entries = vec![coin("k1", "Eagle", "gold"), coin("k2", "Morgan", "silver")];

        let grid = render_grid(&entries);

        assert_eq!(grid.len(), 2);
        assert_eq!(grid.cards[0].id, "k1");
        assert_eq!(grid.cards[1].title, "Morgan");
        assert_eq!(grid.cards[0].weight_label(), "8g");
    }

    #[test]
    fn test_render_empty_grid() {
        assert!(render_grid(&[]).is_empty());
    }

    #[test]
    fn test_filter_buttons_distinct_in_first_appearance_order() {
        let entries = vec![
            coin("k1", "Eagle", "gold"),
            coin("k2", "Morgan", "silver"),
            coin("k3", "Sovereign", "gold"),
        ];

        let buttons = filter_buttons(&entries, &CategoryFilter::All);

        let categories: Vec<_> = buttons.iter().map(|b| b.category.as_str()).collect();
        assert_eq!(categories, vec!["all", "gold", "silver"]);
        assert_eq!(buttons.iter().filter(|b| b.active).count(), 1);
        assert!(buttons[0].active);
    }

    #[test]
    fn test_filter_buttons_mark_active_category() {
        let entries = vec![coin("k1", "Eagle", "gold"), coin("k2", "Morgan", "silver")];

        let buttons = filter_buttons(&entries, &"silver".into());

        let active: Vec<_> = buttons.iter().filter(|b| b.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].category, "silver");
    }

    #[test]
    fn test_filter_buttons_keep_absent_active_category() {
        let entries = vec![coin("k1", "Eagle", "gold")];

        let buttons = filter_buttons(&entries, &"bronze".into());

        assert_eq!(buttons.len(), 3);
        assert!(buttons[2].active);
        assert_eq!(buttons[2].category, "bronze");
    }

    #[test]
    fn test_category_named_all_is_not_confused_with_sentinel() {
        let entries = vec![coin("k1", "Odd", "All")];

        let buttons = filter_buttons(&entries, &CategoryFilter::All);

        assert!(buttons[0].active);
        assert!(!buttons[1].active);
    }
}
