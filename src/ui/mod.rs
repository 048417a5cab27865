//! Presentation logic independent of any particular toolkit.
//!
//! - [`state`] - The explicit view state: entry list, filter, edit target
//! - [`render`] - Pure functions from entries to cards and filter buttons
//! - [`form`] - Raw form input and its conversion into entries
//! - [`controller`] - Wires user actions to the catalog service through a [`controller::View`]
//!
//! Every snapshot the store delivers is authoritative. The controller
//! replaces its list wholesale instead of patching it, so a missed
//! intermediate update can never leave the view out of sync.

pub mod controller;
pub mod form;
pub mod render;
pub mod state;

pub use controller::{
    BusyGuard, CatalogController, Control, Notification, NotificationKind, Notifier, View,
};
pub use form::EntryForm;
pub use render::{Card, CardGrid, FilterButton, filter_buttons, render_grid};
pub use state::{CategoryFilter, ViewState};
