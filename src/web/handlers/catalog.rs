//! Catalog page handlers: grid, filter bar, add form, and removal.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use url::form_urlencoded;

use crate::domain::entities::EntryId;
use crate::error::AppError;
use crate::state::AppState;
use crate::ui::{
    CardGrid, CategoryFilter, EntryForm, FilterButton, ViewState, filter_buttons, render_grid,
};

/// A notification banner rendered into a page.
#[derive(Debug, Clone)]
pub struct Banner {
    pub message: String,
    /// `success` or `error`, used as a CSS modifier.
    pub kind: &'static str,
}

impl Banner {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: "success",
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: "error",
        }
    }
}

/// Template for the catalog page.
///
/// Renders `templates/catalog.html` with the add form, the filter bar, the
/// card grid, and an optional notification banner.
#[derive(Template, WebTemplate)]
#[template(path = "catalog.html")]
pub struct CatalogTemplate {
    pub grid: CardGrid,
    pub filters: Vec<FilterButton>,
    pub active_category: String,
    pub form: EntryForm,
    pub notice: Option<Banner>,
    pub dismiss_ms: u128,
}

/// Query parameters of the catalog page.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    /// Outcome of the action that redirected here: `added`, `updated`, or `removed`.
    pub notice: Option<String>,
}

/// Query parameters carried by form posts to keep the active filter.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub category: Option<String>,
}

fn notice_message(code: &str) -> Option<&'static str> {
    match code {
        "added" => Some("Entry added successfully!"),
        "updated" => Some("Entry updated successfully!"),
        "removed" => Some("Entry removed successfully!"),
        _ => None,
    }
}

/// Loads the catalog and builds the page.
///
/// A failed load still renders the page, with an empty grid and the error
/// in the banner.
pub(crate) async fn catalog_page(
    state: &AppState,
    filter: CategoryFilter,
    form: EntryForm,
    notice: Option<Banner>,
) -> CatalogTemplate {
    let mut view = ViewState::with_filter(filter);

    let notice = match state.catalog_service.fetch_once().await {
        Ok(entries) => {
            view.replace_entries(entries);
            notice
        }
        Err(e) => Some(Banner::error(e.to_string())),
    };

    CatalogTemplate {
        grid: render_grid(view.filtered_entries()),
        filters: filter_buttons(view.all_entries(), view.active_category()),
        active_category: view.active_category().to_string(),
        form,
        notice,
        dismiss_ms: state.notify_dismiss.as_millis(),
    }
}

/// Redirects to the catalog page, keeping the filter and reporting `notice`.
pub(crate) fn redirect_home(filter: &CategoryFilter, notice: &str) -> Redirect {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("category", filter.as_str())
        .append_pair("notice", notice)
        .finish();
    Redirect::to(&format!("/?{query}"))
}

/// Renders the catalog page.
///
/// # Endpoint
///
/// `GET /?category=silver&notice=added`
pub async fn catalog_handler(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> impl IntoResponse {
    let notice = query
        .notice
        .as_deref()
        .and_then(notice_message)
        .map(Banner::success);

    catalog_page(
        &state,
        CategoryFilter::from(query.category),
        EntryForm::default(),
        notice,
    )
    .await
}

/// Handles the add form.
///
/// # Endpoint
///
/// `POST /entries?category=silver`
///
/// On success redirects back to the catalog. On failure re-renders the page
/// with the typed values kept and the error in the banner.
pub async fn add_entry_handler(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
    Form(form): Form<EntryForm>,
) -> Response {
    let filter = CategoryFilter::from(query.category);

    let result = match form.clone().into_entry(None) {
        Ok(entry) => state.catalog_service.add(&entry).await.map(|_| ()),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => redirect_home(&filter, "added").into_response(),
        Err(e) => {
            let banner = Banner::error(format!("Error: {e}"));
            let status = AppError::from(e).status();
            let page = catalog_page(&state, filter, form, Some(banner)).await;
            (status, page).into_response()
        }
    }
}

/// Handles the remove button. The browser asks for confirmation first.
///
/// # Endpoint
///
/// `POST /entries/{id}/delete?category=silver`
pub async fn remove_entry_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Response {
    let filter = CategoryFilter::from(query.category);

    match state.catalog_service.remove(&EntryId::new(id)).await {
        Ok(()) => redirect_home(&filter, "removed").into_response(),
        Err(e) => {
            let banner = Banner::error(format!("Error removing: {e}"));
            let status = AppError::from(e).status();
            let page = catalog_page(&state, filter, EntryForm::default(), Some(banner)).await;
            (status, page).into_response()
        }
    }
}
