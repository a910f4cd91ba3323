//! Integration tests for the health check.

use axum::http::StatusCode;

use super::common::{get, test_app};

#[tokio::test]
async fn test_health_check() {
    let app = test_app();

    let (status, response) = get(app.router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "healthy");
    assert_eq!(response["service"], "rolldice-api");
    assert_eq!(response["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_health_check_does_not_log() {
    let app = test_app();

    get(app.router, "/health").await;

    assert!(app.sink.is_empty());
}
