//! Handler for the health endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Reports whether the catalog can be served.
///
/// # Endpoint
///
/// `GET /health`
///
/// Responds 200 when every check passes, otherwise 503 with the same body.
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "store": { "status": "ok", "message": "Connected" },
///     "catalog": { "status": "ok", "message": "3 entries" }
///   }
/// }
/// ```
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = if state.catalog_service.health_check().await {
        CheckStatus::ok("Connected")
    } else {
        CheckStatus::error("Store unreachable")
    };

    let catalog = match state.catalog_service.fetch_once().await {
        Ok(entries) => CheckStatus::ok(format!("{} entries", entries.len())),
        Err(e) => CheckStatus::error(e.to_string()),
    };

    let response = HealthResponse::from_checks(HealthChecks { store, catalog });
    let code = if response.checks.all_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(response))
}
