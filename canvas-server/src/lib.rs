//! # Canvas Template Server Library
//!
//! Shared types and functionality for the template server.
//! This library is used by both the binary and integration tests.

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;

pub mod config;
pub mod health;
pub mod metrics;
pub mod routes;
pub mod templates;
pub mod validation;

pub use config::ServerConfig;
pub use templates::{StoreError, Template, TemplateStore};

/// Largest accepted request body: a full template plus JSON overhead.
pub const MAX_BODY_LEN: usize = validation::MAX_HTML_LEN + validation::MAX_CSS_LEN + 64 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Template storage.
    pub templates: TemplateStore,
    /// Prometheus handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// State over `templates`, without a metrics endpoint.
    #[must_use]
    pub fn new(templates: TemplateStore) -> Self {
        Self {
            templates,
            metrics: None,
        }
    }

    /// Attach the Prometheus handle served at `/metrics`.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Build the application router: template API, health probes and metrics.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/metrics", get(metrics_handler))
        // Health check endpoints (Kubernetes probes)
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/health", get(health::readiness)) // Backward compatible
        .route(
            "/api/templates",
            get(routes::list_templates).post(routes::create_template),
        )
        .route(
            "/api/templates/{id}",
            get(routes::get_template)
                .put(routes::update_template)
                .delete(routes::delete_template),
        )
        .route("/api/templates/{id}/document", get(routes::template_document))
        .route("/api/render", post(routes::render_document))
        .layer(DefaultBodyLimit::max(MAX_BODY_LEN))
        .with_state(state)
}

/// Prometheus metrics endpoint.
#[tracing::instrument(name = "metrics", skip(state))]
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, String::new()),
    }
}
