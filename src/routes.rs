//! Top-level router configuration combining API and web routes.
//!
//! # Route Structure
//!
//! - `/`            - Browser dashboard (catalog grid, forms, live events)
//! - `GET /health`  - Health check: store connectivity and version
//! - `/api/*`       - JSON REST API
//! - `/static/*`    - Static assets
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::tracing;
use crate::state::AppState;
use crate::web;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::services::ServeDir;

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let router = Router::new()
        .merge(web::routes::routes())
        .route("/health", get(health_handler))
        .nest("/api", api::routes::routes())
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
