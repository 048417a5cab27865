//! DTOs for the health endpoint.

use serde::Serialize;

/// Overall service state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
}

/// Outcome of one component check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Ok,
    Error,
}

#[derive(Debug, Serialize)]
pub struct CheckStatus {
    pub status: CheckState,
    pub message: String,
}

impl CheckStatus {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: CheckState::Ok,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: CheckState::Error,
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == CheckState::Ok
    }
}

/// `store` is the backend's liveness probe; `catalog` is a full read of the
/// collection.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub store: CheckStatus,
    pub catalog: CheckStatus,
}

impl HealthChecks {
    pub fn all_ok(&self) -> bool {
        self.store.is_ok() && self.catalog.is_ok()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    pub version: &'static str,
    pub checks: HealthChecks,
}

impl HealthResponse {
    pub fn from_checks(checks: HealthChecks) -> Self {
        let status = if checks.all_ok() {
            ServiceStatus::Healthy
        } else {
            ServiceStatus::Degraded
        };

        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            checks,
        }
    }
}
