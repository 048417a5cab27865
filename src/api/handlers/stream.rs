//! Handler for the live entry stream.

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use std::convert::Infallible;
use tokio_stream::{Stream, StreamExt};

use crate::api::dto::entry::{CategoryQuery, EntryResponse};
use crate::state::AppState;
use crate::ui::{CategoryFilter, ViewState};

/// Streams the catalog as server-sent events.
///
/// # Endpoint
///
/// `GET /api/entries/stream?category=silver`
///
/// # Events
///
/// - `snapshot` - JSON array of every visible entry, sent on connect and
///   after each change anywhere in the collection
/// - `error` - the store stopped delivering; the stream stays open and the
///   next `snapshot` follows once the store recovers
///
/// The listener is detached when the client disconnects.
pub async fn entries_stream_handler(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let filter = CategoryFilter::from(query.category);
    let updates = state.catalog_service.updates().await;

    let events = updates.map(move |update| {
        let event = match update {
            Ok(entries) => {
                let mut view = ViewState::with_filter(filter.clone());
                view.replace_entries(entries);
                let body: Vec<EntryResponse> = view
                    .filtered_entries()
                    .iter()
                    .cloned()
                    .map(EntryResponse::from)
                    .collect();
                Event::default()
                    .event("snapshot")
                    .json_data(body)
                    .unwrap_or_else(|e| error_event(&e.to_string()))
            }
            Err(e) => error_event(&e.to_string()),
        };
        Ok(event)
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

pub(crate) fn error_event(message: &str) -> Event {
    tracing::warn!("Live stream error: {}", message);
    Event::default().event("error").data(message)
}
