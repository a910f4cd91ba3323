//! Integration tests for the dice endpoints.
//!
//! Tests cover:
//! - Single rolls and their severity-dependent logging
//! - Multi-roll requests and parameter validation

use axum::http::StatusCode;
use rolldice_shared::dice::{DiceRange, ThreadRngDice};
use rolldice_shared::models::{AttributeValue, LogLevel};
use std::sync::Arc;

use super::common::{get, get_text, test_app, test_app_with_dice};

#[tokio::test]
async fn test_rolldice_returns_scripted_values() {
    let app = test_app_with_dice(vec![1, 6, 3]);

    for expected in ["1", "6", "3"] {
        let (status, body) = get_text(app.router.clone(), "/rolldice").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, expected);
    }

    let info = app.sink.records_at(LogLevel::Info);
    assert_eq!(info.len(), 3);
    assert_eq!(info[0].attributes.get("roll_value"), Some(&AttributeValue::Int(1)));

    assert_eq!(app.sink.records_at(LogLevel::Warn).len(), 1);
    assert_eq!(app.sink.records_at(LogLevel::Error).len(), 1);
}

#[tokio::test]
async fn test_rolldice_with_real_dice_stays_in_range() {
    let app = test_app();
    let state = app.state.with_dice(Arc::new(ThreadRngDice));
    let router = rolldice_api::create_router(state);

    for _ in 0..50 {
        let (status, body) = get_text(router.clone(), "/rolldice").await;
        assert_eq!(status, StatusCode::OK);
        let value: i64 = body.parse().unwrap();
        assert!((1..=6).contains(&value), "roll {value} out of range");
    }
}

#[tokio::test]
async fn test_rolldice_records_carry_service_name() {
    let app = test_app_with_dice(vec![4]);

    get_text(app.router, "/rolldice").await;

    let records = app.sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].service, "rolldice-test");
    assert_eq!(records[0].message, "Dice rolled: 4");
}

#[tokio::test]
async fn test_rolldicee_returns_requested_number_of_rolls() {
    let app = test_app();

    let (status, response) = get(app.router, "/rolldicee?rolls=8").await;

    assert_eq!(status, StatusCode::OK);
    let rolls = response.as_array().unwrap();
    assert_eq!(rolls.len(), 8);
    assert!(rolls
        .iter()
        .all(|r| r.as_i64().is_some_and(|v| DiceRange::STANDARD.contains(v))));
    assert_eq!(app.sink.messages(), vec!["Rolled 8 dice"]);
}

#[tokio::test]
async fn test_rolldicee_rejects_missing_or_non_numeric_rolls() {
    for uri in [
        "/rolldicee",
        "/rolldicee?rolls=",
        "/rolldicee?rolls=abc",
        "/rolldicee?rolls=3abc",
    ] {
        let app = test_app();

        let (status, body) = get_text(app.router, uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, "Request parameter 'rolls' is missing or not a number.");

        let errors = app.sink.records_at(LogLevel::Error);
        assert_eq!(errors.len(), 1, "{uri}");
        assert_eq!(errors[0].message, "Invalid roll parameter");
        assert!(errors[0].attributes.contains_key("error_description"));
    }
}

#[tokio::test]
async fn test_rolldicee_rejects_out_of_range_rolls() {
    for uri in [
        "/rolldicee?rolls=0",
        "/rolldicee?rolls=-3",
        "/rolldicee?rolls=1001",
        "/rolldicee?rolls=99999999999999999999",
    ] {
        let app = test_app();

        let (status, body) = get_text(app.router, uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, "Request parameter 'rolls' must be between 1 and 1000.");
    }
}

#[tokio::test]
async fn test_rolldicee_content_type_is_json() {
    let app = test_app();

    let response = tower::ServiceExt::oneshot(
        app.router,
        axum::http::Request::builder()
            .uri("/rolldicee?rolls=2")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok());
    assert!(content_type.is_some_and(|ct| ct.contains("application/json")));
}
