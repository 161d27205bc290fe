//! Health endpoint integration tests
//!
//! - GET /health - Full health check with dependency status
//! - GET /health/ready - Readiness probe
//! - GET /health/live - Liveness probe

use axum::http::StatusCode;
use serde_json::Value;

use crate::common::{FailingFlightStore, TestApp};

#[tokio::test]
async fn test_health_reports_both_stores() {
    let app = TestApp::start().await;

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["checks"]["records"]["status"], "healthy");
    assert_eq!(json["checks"]["records"]["backend"], "in_memory");
    assert_eq!(json["checks"]["sessions"]["backend"], "in_memory");
    assert!(json["checks"]["sessions"].get("error").is_none());
}

#[tokio::test]
async fn test_probes_need_no_session() {
    let app = TestApp::start().await;

    let response = app.server.get("/health/live").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");

    app.server.get("/health/ready").await.assert_status_ok();
}

#[tokio::test]
async fn test_unreachable_record_store_is_unhealthy() {
    let app = TestApp::start_with_store(FailingFlightStore::new("Connection refused")).await;

    let response = app.server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json: Value = response.json();
    assert_eq!(json["status"], "unhealthy");
    assert_eq!(json["checks"]["records"]["error"], "Connection refused");
    assert_eq!(json["checks"]["sessions"]["status"], "healthy");
}
