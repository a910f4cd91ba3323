//! Endpoints that exercise the failure and logging paths of the service.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::time::Duration;
use validator::Validate;

use super::parse_integer;
use crate::error::ApiError;
use crate::state::AppState;

/// Delay before the `/async-error` background task fails.
pub const ASYNC_ERROR_DELAY: Duration = Duration::from_millis(100);

/// Error raised by the `/async-error` background task.
pub const ASYNC_ERROR_MESSAGE: &str = "This is an async error from the /async-error endpoint";

/// Delay before `/debug-logs` answers.
pub const DEBUG_LOGS_DELAY: Duration = Duration::from_secs(1);

/// Number of loop iterations `/logs` runs without a `count` parameter.
pub const DEFAULT_LOG_COUNT: u64 = 10;

/// Largest `count` accepted by `/logs`.
pub const MAX_LOG_COUNT: i64 = 10_000;

/// Query parameters of `/logs`.
#[derive(Debug, Default, Deserialize)]
pub struct LogsQuery {
    /// Number of loop iterations.
    pub count: Option<String>,
}

#[derive(Debug, Validate)]
struct LogsRequest {
    #[validate(range(min = 1, max = MAX_LOG_COUNT))]
    count: i64,
}

impl LogsQuery {
    fn count(&self) -> Result<u64, ApiError> {
        let count = match self.count.as_deref().map(str::trim) {
            None | Some("") => return Ok(DEFAULT_LOG_COUNT),
            Some(raw) => parse_integer(raw).ok_or(ApiError::InvalidCount)?,
        };

        let request = LogsRequest { count };
        request
            .validate()
            .map_err(|_| ApiError::CountOutOfRange { max: MAX_LOG_COUNT })?;
        u64::try_from(request.count).map_err(|_| ApiError::CountOutOfRange { max: MAX_LOG_COUNT })
    }
}

/// Body of the `/debug-logs` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct DebugLogsResponse {
    /// Fixed status text.
    pub status: String,
    /// Time the response was produced (RFC 3339).
    pub time: String,
    /// Hint on where to look for the emitted record.
    pub note: String,
}

/// Creates the diagnostic routes.
pub fn diagnostics_routes() -> Router<AppState> {
    Router::new()
        .route("/crash", get(crash))
        .route("/async-error", get(async_error))
        .route("/logs", get(generate_logs))
        .route("/debug-logs", get(debug_logs))
}

/// Logs, flushes and exits the process with code 1. Never responds.
async fn crash(State(state): State<AppState>) -> Infallible {
    state.logger().error("Crashing the server").emit();
    state.logger().flush();
    state.exit().exit(1);
    std::future::pending().await
}

/// Starts a background task that fails without anyone awaiting its result,
/// then answers 500 once the supervisor has reported it.
async fn async_error(State(state): State<AppState>) -> ApiError {
    state
        .logger()
        .info("About to trigger an async error...")
        .emit();

    if let Err(err) = state.supervisor().spawn(fail_later()).await {
        tracing::warn!(error = %err, "Supervisor task did not complete");
    }

    ApiError::AsyncFailure(ASYNC_ERROR_MESSAGE.to_string())
}

async fn fail_later() -> anyhow::Result<()> {
    tokio::time::sleep(ASYNC_ERROR_DELAY).await;
    Err(anyhow::anyhow!(ASYNC_ERROR_MESSAGE))
}

async fn generate_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Result<String, ApiError> {
    let logger = state.logger();
    let count = query.count().inspect_err(|err| {
        logger
            .error("Invalid count parameter")
            .attr("error_description", err.to_string())
            .emit();
    })?;

    logger.info(format!("Generating {count} log messages")).emit();

    for i in 0..count {
        logger
            .info(format!("Log message {i}: This is a test log message"))
            .emit();
        if i % 3 == 0 {
            logger
                .warn(format!("Warning message {i}: This is a test warning"))
                .emit();
        }
        if i % 5 == 0 {
            logger
                .error(format!("Error message {i}: This is a test error"))
                .emit();
        }
    }

    Ok(format!("Generated {count} log messages"))
}

async fn debug_logs(State(state): State<AppState>) -> Json<DebugLogsResponse> {
    state
        .logger()
        .info("Testing console log")
        .attr("endpoint", "/debug-logs")
        .emit();

    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    state
        .logger()
        .debug(format!("Direct logger emit test at {now}"))
        .attr("endpoint", "/debug-logs")
        .emit();

    tokio::time::sleep(DEBUG_LOGS_DELAY).await;

    Json(DebugLogsResponse {
        status: "Log sent for testing".to_string(),
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        note: "Check the log backend. If the record is missing, check the service output for exporter errors."
            .to_string(),
    })
}
