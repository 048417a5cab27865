//! HTML template rendering handlers for the web dashboard.

mod catalog;
mod edit;
mod events;

pub use catalog::{
    Banner, CatalogTemplate, add_entry_handler, catalog_handler, remove_entry_handler,
};
pub use edit::{EditTemplate, edit_page_handler, update_entry_handler};
pub use events::{LiveFragments, catalog_events_handler, render_fragments};
