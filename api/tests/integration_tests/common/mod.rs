//! Common test utilities and helpers for integration tests.
//!
//! This module provides shared functionality used across all integration tests,
//! including test app setup and HTTP request helpers.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rolldice_api::hooks::ProcessExit;
use rolldice_api::{create_router, AppState};
use rolldice_shared::dice::ScriptedDice;
use rolldice_shared::logging::{MemorySink, StructuredLogger};
use std::sync::{Arc, Mutex};

/// Records exit codes instead of terminating the test process.
#[derive(Debug, Default)]
pub struct RecordingExit {
    codes: Mutex<Vec<i32>>,
}

impl RecordingExit {
    pub fn codes(&self) -> Vec<i32> {
        self.codes.lock().unwrap().clone()
    }
}

impl ProcessExit for RecordingExit {
    fn exit(&self, code: i32) {
        self.codes.lock().unwrap().push(code);
    }
}

/// Everything a test needs to inspect after a request.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub sink: Arc<MemorySink>,
    pub exit: Arc<RecordingExit>,
}

/// Creates a test app whose dice replay `script`.
pub fn test_app_with_dice(script: Vec<i64>) -> TestApp {
    let sink = Arc::new(MemorySink::new());
    let exit = Arc::new(RecordingExit::default());
    let logger = StructuredLogger::new("rolldice-test").with_sink(sink.clone());
    let state = AppState::with_logger(logger)
        .with_dice(Arc::new(ScriptedDice::new(script)))
        .with_exit(exit.clone());

    TestApp {
        router: create_router(state.clone()),
        state,
        sink,
        exit,
    }
}

/// Creates a test app with the default dice script.
pub fn test_app() -> TestApp {
    test_app_with_dice(vec![1, 2, 3, 4, 5, 6])
}

/// Makes a GET request and returns the status and raw body.
pub async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    let response = tower::ServiceExt::oneshot(
        app,
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body_bytes.to_vec()).unwrap())
}

/// Makes a GET request and parses the body as JSON (`Null` if it is not JSON).
pub async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, body) = get_text(app, uri).await;
    let json = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}
