//! Error types for the catalog service and its HTTP surface.
//!
//! - [`CatalogError`] is what every catalog operation reports. It always
//!   carries a human-readable message.
//! - [`AppError`] is its HTTP projection, rendered as a JSON error body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::domain::repositories::StoreError;

/// Failures surfaced by catalog operations.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// The entry breaks an invariant. Detected locally; the store is never contacted.
    #[error("Invalid data. Check all fields: {}", fields.join(", "))]
    Validation { fields: Vec<&'static str> },

    /// The store could not complete a read, write, or subscription.
    #[error("{context}: {source}")]
    Transport {
        context: &'static str,
        #[source]
        source: StoreError,
    },

    /// The operation referenced a key that does not exist.
    #[error("Entry not found: {id}")]
    NotFound { id: String },

    /// An edit was confirmed without selecting an entry first.
    #[error("No entry selected for editing")]
    NoEditTarget,
}

impl CatalogError {
    pub fn validation(fields: Vec<&'static str>) -> Self {
        Self::Validation { fields }
    }

    pub fn transport(context: &'static str, source: StoreError) -> Self {
        Self::Transport { context, source }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// HTTP-facing error with a stable code and free-form details.
#[derive(Debug)]
pub enum AppError {
    Validation { message: String, details: Value },
    NotFound { message: String, details: Value },
    Unavailable { message: String, details: Value },
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::Unavailable {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    fn parts(self) -> (StatusCode, ErrorInfo) {
        let (status, code, message, details) = match self {
            AppError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                details,
            ),
            AppError::NotFound { message, details } => {
                (StatusCode::NOT_FOUND, "not_found", message, details)
            }
            AppError::Unavailable { message, details } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
                message,
                details,
            ),
            AppError::Internal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message,
                details,
            ),
        };

        (
            status,
            ErrorInfo {
                code,
                message,
                details,
            },
        )
    }

    /// Returns the status code this error renders with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Validation { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Unavailable { message, .. }
            | AppError::Internal { message, .. } => f.write_str(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.parts();
        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        let message = err.to_string();
        match err {
            CatalogError::Validation { fields } => {
                AppError::bad_request(message, json!({ "fields": fields }))
            }
            CatalogError::NotFound { id } => AppError::not_found(message, json!({ "id": id })),
            CatalogError::Transport { context, source } => AppError::unavailable(
                message,
                json!({ "operation": context, "reason": source.to_string() }),
            ),
            CatalogError::NoEditTarget => AppError::internal(message, json!({})),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
        fields.sort_unstable();

        AppError::bad_request(
            "Invalid data. Check all fields",
            json!({ "fields": fields }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_fields() {
        let err = CatalogError::validation(vec!["title", "weight"]);
        assert_eq!(err.to_string(), "Invalid data. Check all fields: title, weight");
    }

    #[test]
    fn test_transport_message_wraps_source() {
        let err = CatalogError::transport(
            "Error adding entry",
            StoreError::PermissionDenied("read-only".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "Error adding entry: permission denied: read-only"
        );
    }

    #[test]
    fn test_catalog_error_status_mapping() {
        let cases = [
            (CatalogError::validation(vec!["title"]), StatusCode::BAD_REQUEST),
            (CatalogError::not_found("abc"), StatusCode::NOT_FOUND),
            (
                CatalogError::transport("Error", StoreError::Unavailable("down".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (CatalogError::NoEditTarget, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status(), expected);
        }
    }
}
