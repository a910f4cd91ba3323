//! Log data model.
//!
//! Defines the `LogRecord` structure written to the console and forwarded to
//! the OpenTelemetry log pipeline.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Log severity level.
///
/// Each level maps onto the OpenTelemetry severity number scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Fine-grained tracing information.
    Trace,
    /// Debug information.
    Debug,
    /// Informational messages.
    Info,
    /// Warning conditions.
    Warn,
    /// Error conditions.
    Error,
}

impl LogLevel {
    /// Returns the OpenTelemetry severity number for this level.
    ///
    /// See <https://opentelemetry.io/docs/specs/otel/logs/data-model/#field-severitynumber>.
    #[must_use]
    pub const fn severity_number(self) -> i32 {
        match self {
            Self::Trace => 1,
            Self::Debug => 5,
            Self::Info => 9,
            Self::Warn => 13,
            Self::Error => 17,
        }
    }

    /// Returns the upper-case severity text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

/// Error returned when a string does not name a log level.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown log level: {0}")]
pub struct ParseLogLevelError(String);

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TRACE" => Ok(Self::Trace),
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            _ => Err(ParseLogLevelError(s.to_string())),
        }
    }
}

/// A scalar attribute value attached to a log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    String(String),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u16> for AttributeValue {
    fn from(value: u16) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// Keys owned by the record itself. Attributes using them are left out of
/// the console line.
pub const RESERVED_KEYS: [&str; 4] = ["timestamp", "level", "message", "service"];

/// A single structured log event.
///
/// Records are built once and then handed, by reference, to every sink.
///
/// # Example
///
/// ```
/// use rolldice_shared::models::{LogLevel, LogRecord};
///
/// let record = LogRecord::new(LogLevel::Warn, "Low dice roll: 1", "dice-service")
///     .with_attribute("roll_value", 1);
///
/// assert_eq!(record.level.severity_number(), 13);
/// assert!(record.to_console_json().contains("\"roll_value\":1"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// Time at which the event was recorded.
    pub timestamp: DateTime<Utc>,

    /// Severity of the event.
    pub level: LogLevel,

    /// Human readable message.
    pub message: String,

    /// Additional scalar attributes, sorted by key.
    pub attributes: BTreeMap<String, AttributeValue>,

    /// Name of the service that produced the record.
    pub service: String,
}

impl LogRecord {
    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn new(level: LogLevel, message: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            attributes: BTreeMap::new(),
            service: service.into(),
        }
    }

    /// Adds an attribute, replacing any previous value under the same key.
    #[must_use]
    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Overrides the record timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Formats the timestamp as RFC 3339 with millisecond precision.
    #[must_use]
    pub fn timestamp_rfc3339(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Renders the record as the single-line JSON object written to stdout.
    ///
    /// Field order is fixed: `timestamp`, `level`, `message`, the attributes
    /// in key order, then `service`.
    #[must_use]
    pub fn to_console_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{:?},\"service\":{:?}}}",
                self.timestamp_rfc3339(),
                self.level,
                self.message,
                self.service
            )
        })
    }
}

impl Serialize for LogRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("timestamp", &self.timestamp_rfc3339())?;
        map.serialize_entry("level", &self.level)?;
        map.serialize_entry("message", &self.message)?;
        for (key, value) in &self.attributes {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry("service", &self.service)?;
        map.end()
    }
}

/// Console line layout: core fields plus attributes inlined at the top level.
#[derive(Deserialize)]
struct ConsoleLine {
    timestamp: DateTime<Utc>,
    #[serde(default)]
    level: LogLevel,
    message: String,
    service: String,
    #[serde(flatten)]
    attributes: BTreeMap<String, AttributeValue>,
}

impl<'de> Deserialize<'de> for LogRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let line = ConsoleLine::deserialize(deserializer)?;
        let attributes = line
            .attributes
            .into_iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .collect();
        Ok(Self {
            timestamp: line.timestamp,
            level: line.level,
            message: line.message,
            attributes,
            service: line.service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_severity_numbers() {
        assert_eq!(LogLevel::Trace.severity_number(), 1);
        assert_eq!(LogLevel::Debug.severity_number(), 5);
        assert_eq!(LogLevel::Info.severity_number(), 9);
        assert_eq!(LogLevel::Warn.severity_number(), 13);
        assert_eq!(LogLevel::Error.severity_number(), 17);
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Trace.to_string(), "TRACE");
        assert_eq!(LogLevel::Info.to_string(), "INFO");
        assert_eq!(LogLevel::Error.to_string(), "ERROR");
    }

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("Debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert!("fatal".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_log_level_serialization() {
        assert_eq!(serde_json::to_string(&LogLevel::Warn).unwrap(), "\"WARN\"");
        let level: LogLevel = serde_json::from_str("\"ERROR\"").unwrap();
        assert_eq!(level, LogLevel::Error);
    }

    #[test]
    fn test_record_new() {
        let record = LogRecord::new(LogLevel::Info, "Dice rolled: 4", "dice");

        assert_eq!(record.level, LogLevel::Info);
        assert_eq!(record.message, "Dice rolled: 4");
        assert_eq!(record.service, "dice");
        assert!(record.attributes.is_empty());
    }

    #[test]
    fn test_console_json_layout() {
        let record = LogRecord::new(LogLevel::Error, "Unexpectedly high dice roll: 6", "node-app")
            .with_timestamp(fixed_time())
            .with_attribute("roll_value", 6)
            .with_attribute("error_description", "Dice roll should be between 1 and 6");

        assert_eq!(
            record.to_console_json(),
            concat!(
                r#"{"timestamp":"2024-01-15T10:30:00.000Z","level":"ERROR","#,
                r#""message":"Unexpectedly high dice roll: 6","#,
                r#""error_description":"Dice roll should be between 1 and 6","#,
                r#""roll_value":6,"service":"node-app"}"#
            )
        );
    }

    #[test]
    fn test_console_json_is_stable_across_calls() {
        let build = || {
            LogRecord::new(LogLevel::Warn, "Low dice roll: 1", "svc")
                .with_attribute("zeta", true)
                .with_attribute("alpha", 1.5)
                .with_attribute("roll_value", 1)
                .with_timestamp(fixed_time())
        };

        assert_eq!(build().to_console_json(), build().to_console_json());
    }

    #[test]
    fn test_console_json_skips_reserved_attribute_keys() {
        let record = LogRecord::new(LogLevel::Info, "real message", "svc")
            .with_attribute("message", "shadow")
            .with_attribute("service", "other");

        let value: serde_json::Value = serde_json::from_str(&record.to_console_json()).unwrap();
        assert_eq!(value["message"], "real message");
        assert_eq!(value["service"], "svc");
        // Reserved keys stay on the record for the telemetry sink.
        assert_eq!(record.attributes.len(), 2);
    }

    #[test]
    fn test_record_deserializes_console_line() {
        let line = r#"{"timestamp":"2024-01-15T10:30:00.000Z","level":"WARN","message":"m","service":"s"}"#;
        let record: LogRecord = serde_json::from_str(line).unwrap();

        assert_eq!(record.level, LogLevel::Warn);
        assert_eq!(record.timestamp, fixed_time());
    }

    #[test]
    fn test_console_line_round_trip_keeps_attributes() {
        let record = LogRecord::new(LogLevel::Error, "Unexpectedly high dice roll: 6", "svc")
            .with_timestamp(fixed_time())
            .with_attribute("roll_value", 6)
            .with_attribute("error_description", "Dice roll should be between 1 and 6")
            .with_attribute("ratio", 0.5)
            .with_attribute("flagged", true);

        let parsed: LogRecord = serde_json::from_str(&record.to_console_json()).unwrap();

        assert_eq!(parsed, record);
        assert_eq!(parsed.attributes.get("roll_value"), Some(&AttributeValue::Int(6)));
    }

    #[test]
    fn test_attribute_value_display() {
        assert_eq!(AttributeValue::from(3).to_string(), "3");
        assert_eq!(AttributeValue::from("x").to_string(), "x");
        assert_eq!(AttributeValue::from(false).to_string(), "false");
    }
}
