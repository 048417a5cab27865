//! Handlers for catalog entry endpoints (list, create, update, delete).

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::entry::{CategoryQuery, CreatedResponse, EntryRequest, EntryResponse};
use crate::domain::entities::EntryId;
use crate::error::AppError;
use crate::state::AppState;
use crate::ui::{CategoryFilter, ViewState};

/// Lists catalog entries, optionally restricted to one category.
///
/// # Endpoint
///
/// `GET /api/entries?category=silver`
///
/// Entries come back in store key order, which is creation order.
///
/// # Errors
///
/// Returns 503 Service Unavailable if the store cannot be read.
pub async fn list_entries_handler(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<EntryResponse>>, AppError> {
    let entries = state.catalog_service.fetch_once().await?;

    let mut view = ViewState::with_filter(CategoryFilter::from(query.category));
    view.replace_entries(entries);

    Ok(Json(
        view.filtered_entries()
            .iter()
            .cloned()
            .map(EntryResponse::from)
            .collect(),
    ))
}

/// Adds a new entry.
///
/// # Endpoint
///
/// `POST /api/entries`
///
/// # Request Body
///
/// ```json
/// {
///   "title": "Silver Dollar",
///   "description": "1921 coin",
///   "category": "silver",
///   "image": "http://x/y.png",
///   "weight": 26.73,
///   "manufactureYear": 1921
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if validation fails.
/// Returns 503 Service Unavailable if the write fails.
pub async fn create_entry_handler(
    State(state): State<AppState>,
    Json(payload): Json<EntryRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    payload.validate()?;

    let id = state
        .catalog_service
        .add(&payload.into_entry(None))
        .await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Replaces every field of an entry except its id and creation time.
///
/// # Endpoint
///
/// `PUT /api/entries/{id}`
///
/// # Errors
///
/// Returns 400 Bad Request if validation fails.
/// Returns 404 Not Found if the entry does not exist.
/// Returns 503 Service Unavailable if the write fails.
pub async fn update_entry_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<EntryRequest>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;

    let id = EntryId::new(id);
    let entry = payload.into_entry(Some(id.clone()));
    state.catalog_service.update(&id, &entry).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Deletes an entry. Deleting an unknown id succeeds.
///
/// # Endpoint
///
/// `DELETE /api/entries/{id}`
///
/// # Errors
///
/// Returns 503 Service Unavailable if the delete fails.
pub async fn delete_entry_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.catalog_service.remove(&EntryId::new(id)).await?;

    Ok(StatusCode::NO_CONTENT)
}
