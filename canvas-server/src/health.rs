//! Health check endpoints for Kubernetes probes.
//!
//! Provides liveness and readiness probes for container orchestration:
//! - `/health/live` - Liveness probe (restart if fails)
//! - `/health/ready` - Readiness probe (remove from LB if fails)
//! - `/health` - Combined check for backward compatibility

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

/// Health status response.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Overall status: "healthy" or "unhealthy"
    pub status: &'static str,
    /// Server version
    pub version: &'static str,
    /// Number of stored templates
    pub templates: usize,
    /// Individual component checks
    pub checks: HealthChecks,
}

/// Individual health checks.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// Template store lock not poisoned
    pub template_store: bool,
    /// Data directory present, or persistence disabled
    pub data_dir: bool,
}

/// Liveness probe - is the server running?
///
/// Returns 200 OK if the process is alive.
#[tracing::instrument(name = "liveness_probe")]
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe - is the server ready to accept traffic?
///
/// Checks that no writer panicked inside the template store and, when
/// persistence is enabled, that the data directory still exists.
#[tracing::instrument(name = "readiness_probe", skip(state))]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let templates = state.templates.len();
    let store_ok = state.templates.is_consistent();

    let dir_ok = state.templates.data_dir().map_or(true, std::path::Path::is_dir);

    let all_ok = store_ok && dir_ok;

    let status = HealthStatus {
        status: if all_ok { "healthy" } else { "unhealthy" },
        version: env!("CARGO_PKG_VERSION"),
        templates,
        checks: HealthChecks {
            template_store: store_ok,
            data_dir: dir_ok,
        },
    };

    let code = if all_ok {
        StatusCode::OK
    } else {
        tracing::warn!(store_ok, dir_ok, "Readiness check failed");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(status))
}
