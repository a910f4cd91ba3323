//! Integration tests for the diagnostic endpoints.
//!
//! Tests cover:
//! - `/logs` bursts and their severity pattern
//! - `/crash` exiting without a response
//! - `/async-error` rejections
//! - `/debug-logs` delayed answer

use axum::http::StatusCode;
use rolldice_api::routes::{ASYNC_ERROR_DELAY, ASYNC_ERROR_MESSAGE, DEBUG_LOGS_DELAY};
use rolldice_shared::models::LogLevel;
use std::time::Duration;

use super::common::{get, get_text, test_app};

fn messages_at(app: &super::common::TestApp, level: LogLevel) -> Vec<String> {
    app.sink
        .records_at(level)
        .into_iter()
        .map(|r| r.message)
        .collect()
}

#[tokio::test]
async fn test_logs_count_five() {
    let app = test_app();

    let (status, body) = get_text(app.router.clone(), "/logs?count=5").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Generated 5 log messages");

    let info = messages_at(&app, LogLevel::Info);
    assert_eq!(info.len(), 6);
    assert_eq!(info[0], "Generating 5 log messages");
    assert_eq!(info[5], "Log message 4: This is a test log message");

    assert_eq!(
        messages_at(&app, LogLevel::Warn),
        vec![
            "Warning message 0: This is a test warning",
            "Warning message 3: This is a test warning"
        ]
    );
    assert_eq!(
        messages_at(&app, LogLevel::Error),
        vec!["Error message 0: This is a test error"]
    );
}

#[tokio::test]
async fn test_logs_default_count() {
    let app = test_app();

    let (status, body) = get_text(app.router.clone(), "/logs").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Generated 10 log messages");
    assert_eq!(messages_at(&app, LogLevel::Info).len(), 11);
    // 0, 3, 6, 9
    assert_eq!(messages_at(&app, LogLevel::Warn).len(), 4);
    // 0, 5
    assert_eq!(messages_at(&app, LogLevel::Error).len(), 2);
}

#[tokio::test]
async fn test_logs_records_are_ordered() {
    let app = test_app();

    get_text(app.router.clone(), "/logs?count=1").await;

    assert_eq!(
        app.sink.messages(),
        vec![
            "Generating 1 log messages",
            "Log message 0: This is a test log message",
            "Warning message 0: This is a test warning",
            "Error message 0: This is a test error",
        ]
    );
}

#[tokio::test]
async fn test_logs_rejects_invalid_count() {
    for (uri, expected) in [
        ("/logs?count=ten", "Request parameter 'count' is not a number."),
        ("/logs?count=0", "Request parameter 'count' must be between 1 and 10000."),
        ("/logs?count=-1", "Request parameter 'count' must be between 1 and 10000."),
        (
            "/logs?count=99999999999999999999",
            "Request parameter 'count' must be between 1 and 10000.",
        ),
    ] {
        let app = test_app();

        let (status, body) = get_text(app.router.clone(), uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, expected);
        assert_eq!(messages_at(&app, LogLevel::Error), vec!["Invalid count parameter"]);
    }
}

#[tokio::test]
async fn test_crash_exits_with_code_one_and_never_responds() {
    let app = test_app();

    let outcome = tokio::time::timeout(
        Duration::from_millis(200),
        get_text(app.router.clone(), "/crash"),
    )
    .await;

    assert!(outcome.is_err(), "crash endpoint must not respond");
    assert_eq!(app.exit.codes(), vec![1]);
    assert_eq!(messages_at(&app, LogLevel::Error), vec!["Crashing the server"]);
}

#[tokio::test(start_paused = true)]
async fn test_async_error_is_reported_as_unhandled_rejection() {
    let app = test_app();
    let started = tokio::time::Instant::now();

    let (status, body) = get_text(app.router.clone(), "/async-error").await;

    assert!(started.elapsed() >= ASYNC_ERROR_DELAY);
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, ASYNC_ERROR_MESSAGE);
    assert_eq!(app.state.supervisor().rejection_count(), 1);

    let errors = app.sink.records_at(LogLevel::Error);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Unhandled rejection");
    assert_eq!(
        errors[0]
            .attributes
            .get("error.message")
            .map(ToString::to_string)
            .as_deref(),
        Some(ASYNC_ERROR_MESSAGE)
    );
}

#[tokio::test(start_paused = true)]
async fn test_debug_logs() {
    let app = test_app();
    let started = tokio::time::Instant::now();

    let (status, response) = get(app.router.clone(), "/debug-logs").await;

    assert!(started.elapsed() >= DEBUG_LOGS_DELAY);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "Log sent for testing");
    assert!(response["time"].is_string());
    assert!(response["note"].is_string());

    let debug = app.sink.records_at(LogLevel::Debug);
    assert_eq!(debug.len(), 1);
    assert_eq!(
        debug[0].attributes.get("endpoint").map(ToString::to_string).as_deref(),
        Some("/debug-logs")
    );
}
