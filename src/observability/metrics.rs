//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define proxy metrics (requests, latency, backend calls, sessions)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `proxy_requests_total` (counter): inbound requests by endpoint, status
//! - `proxy_request_duration_seconds` (histogram): inbound latency by endpoint
//! - `proxy_backend_calls_total` (counter): backend calls by operation, outcome
//! - `proxy_backend_call_duration_seconds` (histogram): backend latency
//! - `proxy_sessions_created_total` (counter): backend sessions established
//! - `proxy_session_cache_size` (gauge): credentials currently cached
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op (tests, metrics disabled)

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished inbound request.
pub fn record_request(endpoint: String, status: u16, start: Instant) {
    counter!(
        "proxy_requests_total",
        "endpoint" => endpoint.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("proxy_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

/// Record a finished backend call; `outcome` is "ok" or an error kind.
pub fn record_backend_call(operation: &'static str, outcome: &'static str, start: Instant) {
    counter!(
        "proxy_backend_calls_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
    histogram!("proxy_backend_call_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}

/// Record a newly established backend session.
pub fn record_session_created() {
    counter!("proxy_sessions_created_total").increment(1);
}

/// Record the number of cached sessions.
pub fn record_session_cache_size(size: usize) {
    gauge!("proxy_session_cache_size").set(size as f64);
}
