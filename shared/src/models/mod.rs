//! Data models for the Rolldice service.
//!
//! This module contains the structured log record shared by every sink.

pub mod log;

pub use log::{AttributeValue, LogLevel, LogRecord, ParseLogLevelError, RESERVED_KEYS};
