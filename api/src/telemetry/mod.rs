//! OpenTelemetry bootstrap.
//!
//! Builds the trace, metric and log providers that export to an OTLP/HTTP
//! collector using the JSON encoding. Initialization is synchronous and runs
//! before the Tokio runtime starts.

mod log_sink;

pub use log_sink::{severity, OtelLogSink};

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::{LogExporter, MetricExporter, Protocol, SpanExporter, WithExportConfig};
use opentelemetry_sdk::error::OTelSdkError;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use rolldice_shared::logging::LogSink;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Instrumentation scope used for spans, metrics and log records.
pub const INSTRUMENTATION_SCOPE: &str = "rolldice-api";

/// Errors raised while initializing or shutting down telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to build an OTLP exporter.
    #[error("failed to build OTLP exporter: {0}")]
    Exporter(#[from] opentelemetry_otlp::ExporterBuildError),

    /// Failed to install the tracing subscriber.
    #[error("failed to initialize tracing subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),

    /// A provider failed to shut down cleanly.
    #[error("telemetry provider shutdown failed: {0}")]
    Shutdown(#[from] OTelSdkError),
}

/// Telemetry configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Whether to export telemetry at all.
    pub enabled: bool,
    /// Value of the `service.name` resource attribute.
    pub service_name: String,
    /// Base URL of the OTLP/HTTP collector, without the signal path.
    pub endpoint: String,
    /// Timeout for span and log exports.
    pub exporter_timeout: Duration,
    /// Interval between metric exports.
    pub metric_export_interval: Duration,
    /// Timeout for metric exports.
    pub metric_export_timeout: Duration,
}

impl TelemetryConfig {
    /// Returns the full URL for a signal, e.g. `http://localhost:4318/v1/logs`.
    #[must_use]
    pub fn signal_endpoint(&self, signal: &str) -> String {
        format!("{}/v1/{signal}", self.endpoint.trim_end_matches('/'))
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service_name: "rolldice-service".to_string(),
            endpoint: "http://localhost:4318".to_string(),
            exporter_timeout: Duration::from_secs(15),
            metric_export_interval: Duration::from_secs(15),
            metric_export_timeout: Duration::from_secs(10),
        }
    }
}

/// Handle on the installed telemetry providers.
///
/// Cloning is cheap; clones refer to the same providers.
#[derive(Clone)]
pub struct Telemetry {
    tracer_provider: SdkTracerProvider,
    meter_provider: SdkMeterProvider,
    logger_provider: SdkLoggerProvider,
}

impl fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Telemetry").finish_non_exhaustive()
    }
}

/// Builds the exporters and providers and registers them globally.
///
/// # Errors
///
/// Returns an error if any OTLP exporter cannot be built.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<Telemetry, TelemetryError> {
    let resource = Resource::builder()
        .with_service_name(config.service_name.clone())
        .with_attribute(KeyValue::new("service.version", env!("CARGO_PKG_VERSION")))
        .build();

    let span_exporter = SpanExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpJson)
        .with_endpoint(config.signal_endpoint("traces"))
        .with_timeout(config.exporter_timeout)
        .build()?;
    let tracer_provider = SdkTracerProvider::builder()
        .with_batch_exporter(span_exporter)
        .with_resource(resource.clone())
        .build();

    let metric_exporter = MetricExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpJson)
        .with_endpoint(config.signal_endpoint("metrics"))
        .with_timeout(config.metric_export_timeout)
        .build()?;
    let reader = PeriodicReader::builder(metric_exporter)
        .with_interval(config.metric_export_interval)
        .build();
    let meter_provider = SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(resource.clone())
        .build();

    let log_exporter = LogExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpJson)
        .with_endpoint(config.signal_endpoint("logs"))
        .with_timeout(config.exporter_timeout)
        .build()?;
    let logger_provider = SdkLoggerProvider::builder()
        .with_batch_exporter(log_exporter)
        .with_resource(resource)
        .build();

    global::set_text_map_propagator(TraceContextPropagator::new());
    global::set_tracer_provider(tracer_provider.clone());
    global::set_meter_provider(meter_provider.clone());

    Ok(Telemetry {
        tracer_provider,
        meter_provider,
        logger_provider,
    })
}

impl Telemetry {
    /// Returns a log sink that forwards records to the OTLP log pipeline.
    #[must_use]
    pub fn log_sink(&self) -> Arc<dyn LogSink> {
        Arc::new(OtelLogSink::new(self.logger_provider.clone()))
    }

    /// Returns the SDK tracer for the service's instrumentation scope.
    #[must_use]
    pub fn tracer(&self) -> SdkTracer {
        self.tracer_provider.tracer(INSTRUMENTATION_SCOPE)
    }

    /// Returns a `tracing` layer exporting spans through the tracer provider.
    pub fn tracing_layer<S>(&self) -> impl Layer<S>
    where
        S: tracing::Subscriber + for<'span> LookupSpan<'span>,
    {
        tracing_opentelemetry::layer().with_tracer(self.tracer())
    }

    /// Exports everything buffered so far. Failures are logged, not returned.
    pub fn force_flush(&self) {
        if let Err(err) = self.tracer_provider.force_flush() {
            tracing::warn!(error = %err, "Failed to flush spans");
        }
        if let Err(err) = self.meter_provider.force_flush() {
            tracing::warn!(error = %err, "Failed to flush metrics");
        }
        if let Err(err) = self.logger_provider.force_flush() {
            tracing::warn!(error = %err, "Failed to flush log records");
        }
    }

    /// Flushes and shuts down every provider.
    ///
    /// All providers are shut down even if an earlier one fails.
    ///
    /// # Errors
    ///
    /// Returns the first shutdown error.
    pub fn shutdown(self) -> Result<(), TelemetryError> {
        let results = [
            self.tracer_provider.shutdown(),
            self.meter_provider.shutdown(),
            self.logger_provider.shutdown(),
        ];
        for result in results {
            result?;
        }
        Ok(())
    }
}

/// Installs the global `tracing` subscriber.
///
/// Diagnostics are written to stdout as JSON, filtered by `RUST_LOG`
/// (default `info`). When `telemetry` is given, spans are also exported.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(telemetry: Option<&Telemetry>) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json());

    match telemetry {
        Some(telemetry) => registry.with(telemetry.tracing_layer()).try_init()?,
        None => registry.try_init()?,
    }

    Ok(())
}
