//! Rolldice API Server Binary
//!
//! Entry point for the dice service.

#![deny(unsafe_code)]

use anyhow::{Context, Result};
use rolldice_api::hooks::{install_panic_hook, ExitProcess};
use rolldice_api::telemetry::{init_telemetry, init_tracing};
use rolldice_api::{build_logger, run_server, AppState, Config};
use std::sync::Arc;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    // Telemetry is built before the runtime so the blocking HTTP exporters
    // never run inside an async context.
    let telemetry = if config.telemetry.enabled {
        Some(init_telemetry(&config.telemetry)?)
    } else {
        None
    };
    init_tracing(telemetry.as_ref())?;

    let logger = build_logger(&config, telemetry.as_ref());
    install_panic_hook(logger.clone());

    let exit = match &telemetry {
        Some(telemetry) => ExitProcess::new(logger.clone()).with_telemetry(telemetry.clone()),
        None => ExitProcess::new(logger.clone()),
    };
    let state = AppState::with_logger(logger).with_exit(Arc::new(exit));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build Tokio runtime")?;
    let result = runtime.block_on(run_server(&config, state));
    drop(runtime);

    if let Some(telemetry) = telemetry {
        if let Err(err) = telemetry.shutdown() {
            tracing::warn!(error = %err, "Telemetry shutdown failed");
        }
    }

    result
}
