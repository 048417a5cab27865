//! API route configuration.

use crate::api::handlers::{
    create_entry_handler, delete_entry_handler, entries_stream_handler, list_entries_handler,
    update_entry_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, put},
};

/// All API routes.
///
/// # Endpoints
///
/// - `GET    /entries`         - List entries (optional `?category=`)
/// - `POST   /entries`         - Add an entry
/// - `GET    /entries/stream`  - Live snapshots as server-sent events
/// - `PUT    /entries/{id}`    - Update an entry
/// - `DELETE /entries/{id}`    - Remove an entry
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/entries",
            get(list_entries_handler).post(create_entry_handler),
        )
        .route("/entries/stream", get(entries_stream_handler))
        .route(
            "/entries/{id}",
            put(update_entry_handler).delete(delete_entry_handler),
        )
}
