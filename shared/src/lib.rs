//! Rolldice Shared Library
//!
//! This crate contains the types used across the Rolldice service that do not
//! depend on the web framework or the telemetry SDK.
//!
//! # Modules
//!
//! - [`models`] - The structured log record and severity levels
//! - [`dice`] - Dice ranges, rolls and roll sources
//! - [`logging`] - The structured logger and its sinks
//!
//! # Example
//!
//! ```
//! use rolldice_shared::dice::{DiceRange, DiceSource, ThreadRngDice};
//! use rolldice_shared::logging::{MemorySink, StructuredLogger};
//! use std::sync::Arc;
//!
//! let sink = Arc::new(MemorySink::new());
//! let logger = StructuredLogger::new("dice-service").with_sink(sink.clone());
//!
//! let roll = ThreadRngDice.roll(DiceRange::STANDARD);
//! logger
//!     .info(format!("Dice rolled: {roll}"))
//!     .attr("roll_value", roll.value())
//!     .emit();
//!
//! assert_eq!(sink.len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod dice;
pub mod logging;
pub mod models;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde_json;
