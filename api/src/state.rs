//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use rolldice_shared::dice::{DiceSource, ThreadRngDice};
use rolldice_shared::logging::StructuredLogger;
use std::sync::Arc;

use crate::hooks::{ExitProcess, ProcessExit, TaskSupervisor};
use crate::metrics::ServiceMetrics;

/// Application state shared across all request handlers.
///
/// Holds the logger handle, the dice, the background task supervisor, the
/// process-exit hook and the metric instruments.
#[derive(Clone)]
pub struct AppState {
    logger: StructuredLogger,
    dice: Arc<dyn DiceSource>,
    supervisor: TaskSupervisor,
    exit: Arc<dyn ProcessExit>,
    metrics: ServiceMetrics,
}

impl AppState {
    /// Creates the production state: thread-local RNG dice, a real process
    /// exit, and instruments on the global meter provider.
    #[must_use]
    pub fn with_logger(logger: StructuredLogger) -> Self {
        Self {
            dice: Arc::new(ThreadRngDice),
            supervisor: TaskSupervisor::new(logger.clone()),
            exit: Arc::new(ExitProcess::new(logger.clone())),
            metrics: ServiceMetrics::from_global(),
            logger,
        }
    }

    /// Replaces the dice.
    #[must_use]
    pub fn with_dice(mut self, dice: Arc<dyn DiceSource>) -> Self {
        self.dice = dice;
        self
    }

    /// Replaces the process-exit hook.
    #[must_use]
    pub fn with_exit(mut self, exit: Arc<dyn ProcessExit>) -> Self {
        self.exit = exit;
        self
    }

    /// Replaces the metric instruments.
    #[must_use]
    pub fn with_metrics(mut self, metrics: ServiceMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// The structured logger.
    #[must_use]
    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    /// The dice.
    #[must_use]
    pub fn dice(&self) -> &dyn DiceSource {
        self.dice.as_ref()
    }

    /// The background task supervisor.
    #[must_use]
    pub fn supervisor(&self) -> &TaskSupervisor {
        &self.supervisor
    }

    /// The process-exit hook.
    #[must_use]
    pub fn exit(&self) -> &dyn ProcessExit {
        self.exit.as_ref()
    }

    /// The metric instruments.
    #[must_use]
    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("logger", &self.logger)
            .field("supervisor", &self.supervisor)
            .finish_non_exhaustive()
    }
}
