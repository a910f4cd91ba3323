//! Service metrics.
//!
//! Records HTTP request metrics and dice-roll counts through the
//! OpenTelemetry metrics API. Without an installed meter provider the
//! instruments are no-ops.

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use opentelemetry::metrics::{Counter, Histogram, Meter};
use opentelemetry::{global, KeyValue};
use rolldice_shared::dice::DiceRoll;
use std::time::{Duration, Instant};

use crate::telemetry::INSTRUMENTATION_SCOPE;

/// Instruments recorded by the service.
#[derive(Clone)]
pub struct ServiceMetrics {
    request_duration: Histogram<f64>,
    requests: Counter<u64>,
    dice_rolls: Counter<u64>,
}

impl ServiceMetrics {
    /// Creates the instruments on `meter`.
    #[must_use]
    pub fn new(meter: &Meter) -> Self {
        Self {
            request_duration: meter
                .f64_histogram("http.server.request.duration")
                .with_unit("s")
                .with_description("Duration of HTTP server requests")
                .build(),
            requests: meter
                .u64_counter("http.server.requests")
                .with_description("Number of HTTP server requests")
                .build(),
            dice_rolls: meter
                .u64_counter("dice.rolls")
                .with_description("Number of dice rolled, by value")
                .build(),
        }
    }

    /// Creates the instruments on the global meter provider.
    #[must_use]
    pub fn from_global() -> Self {
        Self::new(&global::meter(INSTRUMENTATION_SCOPE))
    }

    /// Records one completed request.
    pub fn record_request(&self, method: &str, route: &str, status: u16, elapsed: Duration) {
        let attributes = [
            KeyValue::new("http.request.method", method.to_string()),
            KeyValue::new("http.route", route.to_string()),
            KeyValue::new("http.response.status_code", i64::from(status)),
        ];
        self.request_duration
            .record(elapsed.as_secs_f64(), &attributes);
        self.requests.add(1, &attributes);
    }

    /// Counts rolls, one data point per value.
    pub fn record_rolls(&self, rolls: &[DiceRoll]) {
        for roll in rolls {
            self.dice_rolls
                .add(1, &[KeyValue::new("roll.value", roll.value())]);
        }
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::from_global()
    }
}

/// Middleware recording duration and count for every request.
///
/// Requests that never complete (such as `/crash`) are not recorded.
pub async fn track_requests(
    State(metrics): State<ServiceMetrics>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path().to_string(), |path| path.as_str().to_string());
    let start = Instant::now();

    let response = next.run(request).await;

    metrics.record_request(&method, &route, response.status().as_u16(), start.elapsed());
    response
}
