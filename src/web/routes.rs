//! Web dashboard route configuration.

use crate::state::AppState;
use crate::web::handlers::{
    add_entry_handler, catalog_events_handler, catalog_handler, edit_page_handler,
    remove_entry_handler, update_entry_handler,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Dashboard routes.
///
/// # Endpoints
///
/// - `GET  /`                    - Catalog page
/// - `POST /entries`             - Add form
/// - `GET  /entries/{id}/edit`   - Edit page
/// - `POST /entries/{id}`        - Edit form
/// - `POST /entries/{id}/delete` - Remove button
/// - `GET  /events`              - Live grid refresh (server-sent events)
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog_handler))
        .route("/entries", post(add_entry_handler))
        .route("/entries/{id}", post(update_entry_handler))
        .route("/entries/{id}/edit", get(edit_page_handler))
        .route("/entries/{id}/delete", post(remove_entry_handler))
        .route("/events", get(catalog_events_handler))
}
