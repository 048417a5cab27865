//! Live grid refresh for the catalog page.

use askama::Template;
use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use serde::Serialize;
use std::convert::Infallible;
use tokio_stream::{Stream, StreamExt};

use super::catalog::FilterQuery;
use crate::api::handlers::stream::error_event;
use crate::domain::entities::Entry;
use crate::state::AppState;
use crate::ui::{CardGrid, CategoryFilter, FilterButton, ViewState, filter_buttons, render_grid};

/// The grid fragment of the catalog page.
#[derive(Template)]
#[template(path = "partials/grid.html")]
pub struct GridPartial {
    pub grid: CardGrid,
    pub active_category: String,
}

/// The filter bar fragment of the catalog page.
#[derive(Template)]
#[template(path = "partials/filters.html")]
pub struct FiltersPartial {
    pub filters: Vec<FilterButton>,
}

/// Payload of a `catalog` event.
#[derive(Debug, Serialize)]
pub struct LiveFragments {
    pub grid: String,
    pub filters: String,
    pub count: usize,
}

/// Renders both fragments for one snapshot.
///
/// # Errors
///
/// Returns the template error if a fragment fails to render.
pub fn render_fragments(
    entries: Vec<Entry>,
    filter: &CategoryFilter,
) -> Result<LiveFragments, askama::Error> {
    let mut view = ViewState::with_filter(filter.clone());
    view.replace_entries(entries);

    let grid = GridPartial {
        grid: render_grid(view.filtered_entries()),
        active_category: filter.to_string(),
    };
    let filters = FiltersPartial {
        filters: filter_buttons(view.all_entries(), view.active_category()),
    };

    Ok(LiveFragments {
        count: grid.grid.len(),
        grid: grid.render()?,
        filters: filters.render()?,
    })
}

/// Streams re-rendered page fragments as server-sent events.
///
/// # Endpoint
///
/// `GET /events?category=silver`
///
/// # Events
///
/// - `catalog` - `{ grid, filters, count }` with HTML for the grid and filter bar
/// - `error` - the store stopped delivering; the page shows the message and
///   the stream stays open for the next `catalog` event
pub async fn catalog_events_handler(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let filter = CategoryFilter::from(query.category);
    let updates = state.catalog_service.updates().await;

    let events = updates.map(move |update| {
        let event = match update.map(|entries| render_fragments(entries, &filter)) {
            Ok(Ok(fragments)) => Event::default()
                .event("catalog")
                .json_data(fragments)
                .unwrap_or_else(|e| error_event(&e.to_string())),
            Ok(Err(e)) => error_event(&format!("Failed to render catalog: {e}")),
            Err(e) => error_event(&e.to_string()),
        };
        Ok(event)
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
