//! Prometheus metrics for canvas-server.
//!
//! Provides metrics collection and a Prometheus-compatible `/metrics` endpoint.

use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

// Metric names as constants for consistency
const TEMPLATE_OPERATIONS_TOTAL: &str = "canvas_template_operations_total";
const TEMPLATES_STORED: &str = "canvas_templates_stored";
const CODEC_DURATION: &str = "canvas_codec_duration_seconds";
const VALIDATION_FAILURES_TOTAL: &str = "canvas_validation_failures_total";

/// Initialize metrics and return the Prometheus handle.
///
/// # Errors
///
/// Returns an error if the Prometheus recorder cannot be installed
/// (e.g., if another recorder is already installed).
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Record a template operation.
///
/// # Arguments
///
/// * `operation` - "create", "list", "get", "update", "delete", "document"
/// * `success` - Whether the operation succeeded
pub fn record_template_operation(operation: &str, success: bool) {
    counter!(
        TEMPLATE_OPERATIONS_TOTAL,
        "operation" => operation.to_string(),
        "success" => success.to_string()
    )
    .increment(1);
}

/// Update the stored template count.
#[allow(clippy::cast_precision_loss)]
pub fn set_templates_stored(count: usize) {
    gauge!(TEMPLATES_STORED).set(count as f64);
}

/// Run a codec pass and record how long it took.
///
/// # Arguments
///
/// * `direction` - "parse" or "serialize"
pub fn time_codec<T>(direction: &'static str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = f();
    histogram!(CODEC_DURATION, "direction" => direction).record(start.elapsed().as_secs_f64());
    out
}

/// Record an input validation failure.
///
/// # Arguments
///
/// * `validation_type` - Field that failed (template_id, name, html, css)
pub fn record_validation_failure(validation_type: &str) {
    counter!(
        VALIDATION_FAILURES_TOTAL,
        "type" => validation_type.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorded_metrics_render() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_template_operation("create", true);
            record_validation_failure("name");
            set_templates_stored(3);
            let value = time_codec("parse", || 7);
            assert_eq!(value, 7);
        });

        let rendered = handle.render();
        assert!(rendered.contains(TEMPLATE_OPERATIONS_TOTAL));
        assert!(rendered.contains("operation=\"create\""));
        assert!(rendered.contains(VALIDATION_FAILURES_TOTAL));
        assert!(rendered.contains("canvas_templates_stored 3"));
        assert!(rendered.contains(CODEC_DURATION));
    }

    #[test]
    fn test_helpers_without_recorder_do_not_panic() {
        record_template_operation("get", false);
        set_templates_stored(0);
        assert_eq!(time_codec("serialize", || "ok"), "ok");
    }
}
