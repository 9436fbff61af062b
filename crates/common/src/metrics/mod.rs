//! Metrics and observability utilities
//!
//! Prometheus-style metrics with standardized naming conventions.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all DocRelay metrics
pub const METRICS_PREFIX: &str = "docrelay";

/// Buckets for upstream latency (search store and chat completion)
pub const UPSTREAM_BUCKETS: &[f64] = &[
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.000,  // 2s
    5.000,  // 5s
    10.00,  // 10s
    30.00,  // 30s
];

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of relay requests by outcome"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "End-to-end relay request latency in seconds"
    );

    describe_histogram!(
        format!("{}_upstream_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Upstream call latency in seconds"
    );

    describe_histogram!(
        format!("{}_search_documents", METRICS_PREFIX),
        Unit::Count,
        "Number of documents returned by the search store"
    );

    describe_counter!(
        format!("{}_telemetry_failures_total", METRICS_PREFIX),
        Unit::Count,
        "Telemetry posts that failed and were dropped"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
        }
    }

    /// Record request completion with an outcome label ("success", "missing_query", ...)
    pub fn finish(self, outcome: &str) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "endpoint" => self.endpoint.clone(),
            "outcome" => outcome.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Record one upstream call
pub fn record_upstream(service: &str, duration_secs: f64, success: bool) {
    let status = if success { "success" } else { "error" };

    histogram!(
        format!("{}_upstream_duration_seconds", METRICS_PREFIX),
        "service" => service.to_string(),
        "status" => status
    )
    .record(duration_secs);
}

/// Record how many documents a search returned
pub fn record_documents(count: usize) {
    histogram!(format!("{}_search_documents", METRICS_PREFIX)).record(count as f64);
}

/// Record a dropped telemetry post
pub fn record_telemetry_failure() {
    counter!(format!("{}_telemetry_failures_total", METRICS_PREFIX)).increment(1);
}
