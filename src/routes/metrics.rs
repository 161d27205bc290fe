//! Prometheus metrics endpoint
//!
//! Exposes application metrics in Prometheus format for monitoring.

use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;

/// Global Prometheus handle for metrics export
static PROMETHEUS_HANDLE: Lazy<PrometheusHandle> = Lazy::new(|| {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
});

/// Initialize metrics (call once at startup)
pub fn init_metrics() {
    let _ = &*PROMETHEUS_HANDLE;

    register_metrics();
}

fn register_metrics() {
    metrics::describe_counter!(
        "flightdesk_insight_requests_total",
        "Insight requests by endpoint and outcome"
    );
    metrics::describe_histogram!(
        "flightdesk_insight_duration_seconds",
        "Time from request to end of the relayed stream"
    );
    metrics::describe_counter!(
        "flightdesk_relay_chunks_total",
        "Non-empty completion chunks forwarded to clients"
    );
    metrics::describe_counter!(
        "flightdesk_login_attempts_total",
        "Panel login attempts by result"
    );
    metrics::describe_counter!(
        "flightdesk_records_deactivated_total",
        "Soft deletes by record kind"
    );
}

/// Prometheus metrics endpoint handler
pub async fn prometheus_metrics() -> impl IntoResponse {
    PROMETHEUS_HANDLE.render()
}

/// Record a finished insight request. `outcome` is one of `completed`,
/// `setup_failed`, `stream_failed` or `disconnected`.
pub fn record_insight_request(endpoint: &str, outcome: &str, duration_secs: f64) {
    metrics::counter!(
        "flightdesk_insight_requests_total",
        "endpoint" => endpoint.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
    metrics::histogram!("flightdesk_insight_duration_seconds", "endpoint" => endpoint.to_string())
        .record(duration_secs);
}

pub fn record_chunks_relayed(count: u64) {
    metrics::counter!("flightdesk_relay_chunks_total").increment(count);
}

pub fn record_login_attempt(result: &str) {
    metrics::counter!("flightdesk_login_attempts_total", "result" => result.to_string())
        .increment(1);
}

pub fn record_creation(kind: &str) {
    metrics::counter!("flightdesk_records_created_total", "kind" => kind.to_string()).increment(1);
}

pub fn record_deactivation(kind: &str) {
    metrics::counter!("flightdesk_records_deactivated_total", "kind" => kind.to_string())
        .increment(1);
}
