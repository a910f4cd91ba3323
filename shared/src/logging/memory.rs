//! In-memory sink.
//!
//! Keeps every record in a `Vec` protected by a `RwLock`. Useful for tests
//! and for inspecting what a handler logged.

use super::LogSink;
use crate::models::{LogLevel, LogRecord};
use std::sync::RwLock;

/// Sink that stores records in memory.
///
/// **Note:** records are never evicted.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: RwLock<Vec<LogRecord>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every stored record, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .read()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Returns the stored records at `level`.
    #[must_use]
    pub fn records_at(&self, level: LogLevel) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|record| record.level == level)
            .collect()
    }

    /// Returns the stored messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .map(|record| record.message)
            .collect()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    /// Returns true if nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every stored record.
    pub fn clear(&self) {
        if let Ok(mut records) = self.records.write() {
            records.clear();
        }
    }
}

impl LogSink for MemorySink {
    fn write(&self, record: &LogRecord) {
        if let Ok(mut records) = self.records.write() {
            records.push(record.clone());
        }
    }
}
