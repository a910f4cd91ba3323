//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::telemetry::TelemetryConfig;

/// Default port the dice service listens on.
pub const DEFAULT_PORT: u16 = 3001;

/// Server configuration.
///
/// Configuration values can be set via environment variables:
/// - `HOST`: The host address to bind to (default: "0.0.0.0")
/// - `PORT`: The port to listen on (default: 3001)
/// - `OTEL_SERVICE_NAME`: The `service.name` resource attribute (default: "rolldice-service")
/// - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP/HTTP collector base URL (default: <http://localhost:4318>)
/// - `OTEL_EXPORTER_OTLP_TIMEOUT`: Span and log export timeout in milliseconds (default: 15000)
/// - `OTEL_METRIC_EXPORT_INTERVAL`: Metric export interval in milliseconds (default: 15000)
/// - `OTEL_METRIC_EXPORT_TIMEOUT`: Metric export timeout in milliseconds (default: 10000)
/// - `TELEMETRY_ENABLED`: Whether to export telemetry (default: true)
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Telemetry export settings.
    pub telemetry: TelemetryConfig,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = parse_var(&lookup, "PORT")?.unwrap_or(defaults.port);

        let telemetry_defaults = defaults.telemetry;
        let telemetry = TelemetryConfig {
            enabled: parse_bool_var(&lookup, "TELEMETRY_ENABLED")?
                .unwrap_or(telemetry_defaults.enabled),
            service_name: lookup("OTEL_SERVICE_NAME").unwrap_or(telemetry_defaults.service_name),
            endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").unwrap_or(telemetry_defaults.endpoint),
            exporter_timeout: parse_millis_var(&lookup, "OTEL_EXPORTER_OTLP_TIMEOUT")?
                .unwrap_or(telemetry_defaults.exporter_timeout),
            metric_export_interval: parse_millis_var(&lookup, "OTEL_METRIC_EXPORT_INTERVAL")?
                .unwrap_or(telemetry_defaults.metric_export_interval),
            metric_export_timeout: parse_millis_var(&lookup, "OTEL_METRIC_EXPORT_TIMEOUT")?
                .unwrap_or(telemetry_defaults.metric_export_timeout),
        };

        let config = Self {
            host,
            port,
            telemetry,
        };
        config.socket_addr()?;
        Ok(config)
    }

    /// Returns the socket address for binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the host and port combination is not a valid socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            telemetry: TelemetryConfig::default(),
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("invalid value for {key}: {raw:?}"))
        })
        .transpose()
}

fn parse_millis_var(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<Duration>> {
    Ok(parse_var::<u64>(lookup, key)?.map(Duration::from_millis))
}

fn parse_bool_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<bool>> {
    lookup(key)
        .map(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(anyhow::anyhow!("invalid value for {key}: {raw:?}")),
        })
        .transpose()
}
