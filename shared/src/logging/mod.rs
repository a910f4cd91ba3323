//! Structured logging.
//!
//! The `LogSink` trait abstracts where log records go. `StructuredLogger`
//! fans each record out to every configured sink.
//!
//! # Example
//!
//! ```
//! use rolldice_shared::logging::{MemorySink, StructuredLogger};
//! use rolldice_shared::models::LogLevel;
//! use std::sync::Arc;
//!
//! let sink = Arc::new(MemorySink::new());
//! let logger = StructuredLogger::new("dice-service").with_sink(sink.clone());
//!
//! logger.info("Dice rolled: 3").attr("roll_value", 3).emit();
//!
//! let records = sink.records();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].level, LogLevel::Info);
//! ```

pub mod console;
pub mod memory;

pub use console::ConsoleSink;
pub use memory::MemorySink;

use crate::models::{AttributeValue, LogLevel, LogRecord};
use std::fmt;
use std::sync::Arc;

/// A destination for log records.
///
/// Sinks must not fail the caller: delivery problems are handled (or
/// dropped) inside the sink.
pub trait LogSink: Send + Sync {
    /// Delivers one record.
    fn write(&self, record: &LogRecord);

    /// Flushes any buffered records. The default does nothing.
    fn flush(&self) {}
}

/// Logger handle passed explicitly to every call site.
///
/// Cloning is cheap; clones share the same sinks.
#[derive(Clone)]
pub struct StructuredLogger {
    service: Arc<str>,
    sinks: Arc<[Arc<dyn LogSink>]>,
}

impl StructuredLogger {
    /// Creates a logger with no sinks.
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        let service: String = service.into();
        Self {
            service: Arc::from(service),
            sinks: Arc::from(Vec::new()),
        }
    }

    /// Returns a logger that additionally writes to `sink`.
    #[must_use]
    pub fn with_sink(self, sink: Arc<dyn LogSink>) -> Self {
        let mut sinks = self.sinks.to_vec();
        sinks.push(sink);
        Self {
            service: self.service,
            sinks: Arc::from(sinks),
        }
    }

    /// The service name stamped on every record.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Number of configured sinks.
    #[must_use]
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Writes a fully built record to every sink.
    pub fn emit(&self, record: &LogRecord) {
        for sink in self.sinks.iter() {
            sink.write(record);
        }
    }

    /// Flushes every sink.
    pub fn flush(&self) {
        for sink in self.sinks.iter() {
            sink.flush();
        }
    }

    /// Starts a log event at `level`.
    pub fn event(&self, level: LogLevel, message: impl Into<String>) -> LogEvent<'_> {
        LogEvent {
            logger: self,
            record: LogRecord::new(level, message, self.service.as_ref()),
        }
    }

    /// Starts a TRACE event.
    pub fn trace(&self, message: impl Into<String>) -> LogEvent<'_> {
        self.event(LogLevel::Trace, message)
    }

    /// Starts a DEBUG event.
    pub fn debug(&self, message: impl Into<String>) -> LogEvent<'_> {
        self.event(LogLevel::Debug, message)
    }

    /// Starts an INFO event.
    pub fn info(&self, message: impl Into<String>) -> LogEvent<'_> {
        self.event(LogLevel::Info, message)
    }

    /// Starts a WARN event.
    pub fn warn(&self, message: impl Into<String>) -> LogEvent<'_> {
        self.event(LogLevel::Warn, message)
    }

    /// Starts an ERROR event.
    pub fn error(&self, message: impl Into<String>) -> LogEvent<'_> {
        self.event(LogLevel::Error, message)
    }
}

impl fmt::Debug for StructuredLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredLogger")
            .field("service", &self.service)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

/// A log record under construction.
#[must_use = "log events are only written when `emit` is called"]
pub struct LogEvent<'a> {
    logger: &'a StructuredLogger,
    record: LogRecord,
}

impl LogEvent<'_> {
    /// Attaches an attribute.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.record = self.record.with_attribute(key, value);
        self
    }

    /// Writes the record to every sink of the logger.
    pub fn emit(self) {
        self.logger.emit(&self.record);
    }

    /// Returns the record without writing it.
    pub fn into_record(self) -> LogRecord {
        self.record
    }
}
