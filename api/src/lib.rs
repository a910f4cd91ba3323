//! Rolldice API Server
//!
//! This crate provides the HTTP server for the dice-rolling demo service. Every
//! request is traced, measured and logged through OpenTelemetry so the service
//! can be used to exercise a collector pipeline end to end.
//!
//! # Architecture
//!
//! The API server is built on Axum and Tokio, providing:
//! - dice endpoints (`/rolldice`, `/rolldicee`)
//! - diagnostic endpoints that crash, fail asynchronously or emit log bursts
//! - OTLP/HTTP export of spans, metrics and structured log records
//!
//! # Example
//!
//! ```no_run
//! use rolldice_api::{build_logger, run_server, AppState, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let state = AppState::with_logger(build_logger(&config, None));
//!     run_server(&config, state).await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod hooks;
pub mod metrics;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::Config;
pub use error::ApiError;
pub use state::AppState;

use anyhow::Result;
use axum::{middleware, Router};
use rolldice_shared::logging::{ConsoleSink, StructuredLogger};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::telemetry::Telemetry;

/// Builds the structured logger: JSON lines on stdout, plus the OTLP log
/// pipeline when telemetry is running.
#[must_use]
pub fn build_logger(config: &Config, telemetry: Option<&Telemetry>) -> StructuredLogger {
    let logger = StructuredLogger::new(config.telemetry.service_name.clone())
        .with_sink(Arc::new(ConsoleSink::stdout()));
    match telemetry {
        Some(telemetry) => logger.with_sink(telemetry.log_sink()),
        None => logger,
    }
}

/// Runs the dice service until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if:
/// - The configured address is invalid
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server(config: &Config, state: AppState) -> Result<()> {
    let addr = config.socket_addr()?;
    let logger = state.logger().clone();

    logger
        .info("Application starting")
        .attr("port", config.port)
        .emit();

    let app = create_router(state);
    let listener = TcpListener::bind(addr).await?;

    logger
        .info(format!("Listening for requests on http://{addr}"))
        .emit();
    logger
        .info("Server started")
        .attr("port", config.port)
        .emit();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    logger.flush();
    Ok(())
}

/// Creates the main application router with all routes and middleware.
///
/// This function is public to allow testing the router without starting a full server.
pub fn create_router(state: AppState) -> Router {
    let service_metrics = state.metrics().clone();

    Router::new()
        .merge(routes::health_routes())
        .merge(routes::dice_routes())
        .merge(routes::diagnostics_routes())
        .layer(middleware::from_fn_with_state(
            service_metrics,
            metrics::track_requests,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
