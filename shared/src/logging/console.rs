//! Console sink.
//!
//! Writes each record as one JSON line. Production code writes to stdout;
//! tests can hand in any `Write` implementation.

use super::LogSink;
use crate::models::LogRecord;
use std::io::{self, Write};
use std::sync::Mutex;

/// Sink that writes `LogRecord::to_console_json` lines to a writer.
#[derive(Debug)]
pub struct ConsoleSink<W: Write + Send = io::Stdout> {
    writer: Mutex<W>,
}

impl ConsoleSink<io::Stdout> {
    /// Creates a sink writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    /// Creates a sink writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> LogSink for ConsoleSink<W> {
    fn write(&self, record: &LogRecord) {
        let line = record.to_console_json();
        let Ok(mut writer) = self.writer.lock() else {
            tracing::warn!("Console log sink lock poisoned, dropping record");
            return;
        };
        if let Err(err) = writeln!(writer, "{line}") {
            tracing::warn!(error = %err, "Failed to write log record to console");
        }
    }

    fn flush(&self) {
        if let Ok(mut writer) = self.writer.lock() {
            if let Err(err) = writer.flush() {
                tracing::warn!(error = %err, "Failed to flush console log sink");
            }
        }
    }
}
