//! Process-level failure hooks.
//!
//! - a panic hook that logs uncaught panics before the default handling runs;
//! - a task supervisor that reports background tasks which fail or panic
//!   without anyone handling the error;
//! - the process-exit seam used by the crash endpoint.

use rolldice_shared::logging::StructuredLogger;
use std::any::Any;
use std::backtrace::Backtrace;
use std::future::Future;
use std::panic::PanicHookInfo;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::telemetry::Telemetry;

/// Terminates the process.
pub trait ProcessExit: Send + Sync {
    /// Exits with `code`. Production implementations never return.
    fn exit(&self, code: i32);
}

/// Flushes the logger and telemetry, then calls [`std::process::exit`].
#[derive(Debug, Clone)]
pub struct ExitProcess {
    logger: StructuredLogger,
    telemetry: Option<Telemetry>,
}

impl ExitProcess {
    /// Creates an exit hook that flushes `logger` first.
    #[must_use]
    pub fn new(logger: StructuredLogger) -> Self {
        Self {
            logger,
            telemetry: None,
        }
    }

    /// Also flushes spans and metrics before exiting.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Telemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }
}

impl ProcessExit for ExitProcess {
    fn exit(&self, code: i32) {
        self.logger.flush();
        if let Some(telemetry) = &self.telemetry {
            telemetry.force_flush();
        }
        std::process::exit(code);
    }
}

/// Extracts a readable message from a panic payload.
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

fn log_panic(logger: &StructuredLogger, info: &PanicHookInfo<'_>) {
    let mut event = logger
        .error("Uncaught exception")
        .attr("error.message", panic_message(info.payload()))
        .attr("error.stack", Backtrace::force_capture().to_string());
    if let Some(location) = info.location() {
        event = event.attr("error.location", location.to_string());
    }
    if let Some(name) = std::thread::current().name() {
        event = event.attr("thread.name", name);
    }
    event.emit();
    logger.flush();
}

/// Installs a panic hook that logs the panic as an ERROR record, flushes the
/// logger, and then runs the previously installed hook.
pub fn install_panic_hook(logger: StructuredLogger) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        log_panic(&logger, info);
        previous(info);
    }));
}

/// Spawns background tasks and reports the ones that fail unobserved.
///
/// A task "rejects" when it returns an error or panics. Each rejection is
/// logged as `Unhandled rejection` and counted.
///
/// A panicking task is reported twice when the panic hook is installed: once
/// as `Uncaught exception` by the hook and once here. The rejection record
/// carries `error.panicked = true` so the pair can be told apart.
#[derive(Debug, Clone)]
pub struct TaskSupervisor {
    logger: StructuredLogger,
    rejections: Arc<AtomicU64>,
}

impl TaskSupervisor {
    /// Creates a supervisor reporting through `logger`.
    #[must_use]
    pub fn new(logger: StructuredLogger) -> Self {
        Self {
            logger,
            rejections: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of rejections reported so far.
    #[must_use]
    pub fn rejection_count(&self) -> u64 {
        self.rejections.load(Ordering::SeqCst)
    }

    /// Spawns `task` on the runtime.
    ///
    /// The returned handle completes once the task has finished and any
    /// rejection has been reported.
    pub fn spawn<F>(&self, task: F) -> JoinHandle<()>
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let inner = tokio::spawn(task);
        let supervisor = self.clone();
        tokio::spawn(async move {
            match inner.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => supervisor.report(&err, false),
                Err(join_err) if join_err.is_panic() => {
                    let message = panic_message(join_err.into_panic().as_ref());
                    supervisor.report(&anyhow::anyhow!("task panicked: {message}"), true);
                }
                Err(join_err) => {
                    tracing::debug!(error = %join_err, "Supervised task cancelled");
                }
            }
        })
    }

    fn report(&self, err: &anyhow::Error, panicked: bool) {
        self.rejections.fetch_add(1, Ordering::SeqCst);
        self.logger
            .error("Unhandled rejection")
            .attr("error.panicked", panicked)
            .attr("error.message", err.to_string())
            .attr("error.chain", format!("{err:#}"))
            .attr("error.stack", format!("{err:?}"))
            .emit();
    }
}
