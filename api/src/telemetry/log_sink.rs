//! Log sink backed by the OpenTelemetry log pipeline.

use opentelemetry::logs::{AnyValue, LogRecord as _, Logger as _, LoggerProvider as _, Severity};
use opentelemetry_sdk::logs::SdkLoggerProvider;
use rolldice_shared::logging::LogSink;
use rolldice_shared::models::{AttributeValue, LogLevel, LogRecord};
use std::fmt;
use std::time::SystemTime;

use super::INSTRUMENTATION_SCOPE;

/// Maps a log level onto the OpenTelemetry severity scale.
#[must_use]
pub const fn severity(level: LogLevel) -> Severity {
    match level {
        LogLevel::Trace => Severity::Trace,
        LogLevel::Debug => Severity::Debug,
        LogLevel::Info => Severity::Info,
        LogLevel::Warn => Severity::Warn,
        LogLevel::Error => Severity::Error,
    }
}

fn any_value(value: &AttributeValue) -> AnyValue {
    match value {
        AttributeValue::Bool(b) => AnyValue::from(*b),
        AttributeValue::Int(i) => AnyValue::from(*i),
        AttributeValue::Float(f) => AnyValue::from(*f),
        AttributeValue::String(s) => AnyValue::from(s.clone()),
    }
}

/// Forwards records to an OpenTelemetry logger.
///
/// `emit` only enqueues the record on the provider's processor, so writing
/// never waits on the network.
pub struct OtelLogSink {
    provider: SdkLoggerProvider,
    logger: <SdkLoggerProvider as opentelemetry::logs::LoggerProvider>::Logger,
}

impl OtelLogSink {
    /// Creates a sink emitting through `provider`.
    #[must_use]
    pub fn new(provider: SdkLoggerProvider) -> Self {
        let logger = provider.logger(INSTRUMENTATION_SCOPE);
        Self { provider, logger }
    }
}

impl fmt::Debug for OtelLogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtelLogSink")
            .field("scope", &INSTRUMENTATION_SCOPE)
            .finish_non_exhaustive()
    }
}

impl LogSink for OtelLogSink {
    fn write(&self, record: &LogRecord) {
        let mut otel_record = self.logger.create_log_record();
        otel_record.set_timestamp(SystemTime::from(record.timestamp));
        otel_record.set_observed_timestamp(SystemTime::now());
        otel_record.set_severity_number(severity(record.level));
        otel_record.set_severity_text(record.level.as_str());
        otel_record.set_body(AnyValue::from(record.message.clone()));
        for (key, value) in &record.attributes {
            otel_record.add_attribute(key.clone(), any_value(value));
        }
        otel_record.add_attribute("service", record.service.clone());

        self.logger.emit(otel_record);
    }

    fn flush(&self) {
        if let Err(err) = self.provider.force_flush() {
            tracing::warn!(error = %err, "Failed to flush OpenTelemetry log records");
        }
    }
}
