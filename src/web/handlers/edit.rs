//! Edit page handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};

use super::catalog::{Banner, FilterQuery, catalog_page, redirect_home};
use crate::domain::entities::EntryId;
use crate::error::{AppError, CatalogError};
use crate::state::AppState;
use crate::ui::{CategoryFilter, EntryForm, ViewState};

/// Template for the edit page.
///
/// Renders `templates/edit.html` with the six entry fields pre-filled.
#[derive(Template, WebTemplate)]
#[template(path = "edit.html")]
pub struct EditTemplate {
    pub id: String,
    pub form: EntryForm,
    pub active_category: String,
    pub notice: Option<Banner>,
    pub dismiss_ms: u128,
}

/// Opens the edit page for one entry.
///
/// # Endpoint
///
/// `GET /entries/{id}/edit?category=silver`
///
/// An unknown id renders the catalog page with a 404 status and an error banner.
pub async fn edit_page_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Response {
    let filter = CategoryFilter::from(query.category);
    let id = EntryId::new(id);

    let found = match state.catalog_service.fetch_once().await {
        Ok(entries) => {
            let mut view = ViewState::new();
            view.replace_entries(entries);
            view.find(&id)
                .map(EntryForm::from_entry)
                .ok_or_else(|| CatalogError::not_found(id.as_str()))
        }
        Err(e) => Err(e),
    };

    match found {
        Ok(form) => EditTemplate {
            id: id.to_string(),
            form,
            active_category: filter.to_string(),
            notice: None,
            dismiss_ms: state.notify_dismiss.as_millis(),
        }
        .into_response(),
        Err(e) => {
            let banner = Banner::error(format!("Error: {e}"));
            let status = AppError::from(e).status();
            let page = catalog_page(&state, filter, EntryForm::default(), Some(banner)).await;
            (status, page).into_response()
        }
    }
}

/// Saves the edit form.
///
/// # Endpoint
///
/// `POST /entries/{id}?category=silver`
///
/// On success redirects to the catalog. On failure the edit page stays open
/// with the typed values and the error in the banner.
pub async fn update_entry_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
    Form(form): Form<EntryForm>,
) -> Response {
    let filter = CategoryFilter::from(query.category);
    let id = EntryId::new(id);

    let result = match form.clone().into_entry(Some(id.clone())) {
        Ok(entry) => state.catalog_service.update(&id, &entry).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => redirect_home(&filter, "updated").into_response(),
        Err(e) => {
            let notice = Some(Banner::error(format!("Error updating: {e}")));
            let status = AppError::from(e).status();
            let page = EditTemplate {
                id: id.to_string(),
                form,
                active_category: filter.to_string(),
                notice,
                dismiss_ms: state.notify_dismiss.as_millis(),
            };
            (status, page).into_response()
        }
    }
}
