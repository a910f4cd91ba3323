//! API route definitions.
//!
//! This module organizes all HTTP routes for the dice service.

mod diagnostics;
mod dice;
mod health;

pub use diagnostics::{
    diagnostics_routes, DebugLogsResponse, LogsQuery, ASYNC_ERROR_DELAY, ASYNC_ERROR_MESSAGE,
    DEBUG_LOGS_DELAY, DEFAULT_LOG_COUNT, MAX_LOG_COUNT,
};
pub use dice::{dice_routes, RollsQuery, MAX_ROLLS};
pub use health::{health_routes, HealthResponse};

use std::num::IntErrorKind;

/// Parses a query parameter as a whole integer.
///
/// Trailing garbage is rejected, so `"3abc"` is not a number. Integers too
/// large for `i64` saturate, so they fail range validation instead.
fn parse_integer(raw: &str) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(value) => Some(value),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}
