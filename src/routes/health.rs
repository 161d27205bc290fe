//! Health check endpoints
//!
//! - `/health` - Full health check with dependency status
//! - `/health/ready` - Readiness probe
//! - `/health/live` - Liveness probe

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

/// Health status enum
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Individual dependency check result
#[derive(Debug, Serialize)]
pub struct DependencyCheck {
    pub status: HealthStatus,
    pub backend: &'static str,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DependencyCheck {
    fn from_result<E: std::fmt::Display>(
        backend: &'static str,
        start: Instant,
        result: Result<(), E>,
    ) -> Self {
        let latency_ms = start.elapsed().as_millis() as u64;
        match result {
            Ok(()) => Self {
                status: HealthStatus::Healthy,
                backend,
                latency_ms,
                error: None,
            },
            Err(e) => Self {
                status: HealthStatus::Unhealthy,
                backend,
                latency_ms,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Dependency checks collection
#[derive(Debug, Serialize)]
pub struct DependencyChecks {
    pub records: DependencyCheck,
    pub sessions: DependencyCheck,
}

/// Full health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: String,
    pub checks: DependencyChecks,
}

/// Simple health response for liveness/readiness
#[derive(Debug, Serialize)]
pub struct SimpleHealthResponse {
    pub status: HealthStatus,
}

async fn check_dependencies(state: &AppState) -> DependencyChecks {
    let start = Instant::now();
    let records = DependencyCheck::from_result(state.store.name(), start, state.store.ping().await);

    let start = Instant::now();
    let sessions = DependencyCheck::from_result(
        state.sessions.backend_name(),
        start,
        state.sessions.ping().await,
    );

    DependencyChecks { records, sessions }
}

fn overall_status(checks: &DependencyChecks) -> HealthStatus {
    // Insights and login both need the two stores, so either one down is fatal.
    if checks.records.status == HealthStatus::Unhealthy
        || checks.sessions.status == HealthStatus::Unhealthy
    {
        HealthStatus::Unhealthy
    } else {
        HealthStatus::Healthy
    }
}

fn status_code(status: &HealthStatus) -> StatusCode {
    match status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Full health check endpoint
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let checks = check_dependencies(&state).await;
    let status = overall_status(&checks);

    let response = HealthResponse {
        status: status.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        checks,
    };

    (status_code(&status), Json(response))
}

/// Readiness probe endpoint
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<SimpleHealthResponse>) {
    let status = overall_status(&check_dependencies(&state).await);
    (status_code(&status), Json(SimpleHealthResponse { status }))
}

/// Liveness probe endpoint
pub async fn liveness_check() -> (StatusCode, Json<SimpleHealthResponse>) {
    (
        StatusCode::OK,
        Json(SimpleHealthResponse {
            status: HealthStatus::Healthy,
        }),
    )
}
