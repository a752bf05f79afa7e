//! Metrics collection and exposition.
//!
//! # Metrics
//! - `kv_requests_total` (counter): inbound requests by service, method, status
//! - `kv_request_duration_seconds` (histogram): inbound latency by service
//! - `kv_store_queries_total` (counter): store statements by operation, outcome
//! - `kv_store_query_duration_seconds` (histogram): store latency by operation

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(service: &str, method: &str, status: u16, start: Instant) {
    counter!(
        "kv_requests_total",
        "service" => service.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("kv_request_duration_seconds", "service" => service.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_store_query(operation: &'static str, success: bool, start: Instant) {
    let outcome = if success { "ok" } else { "error" };
    counter!("kv_store_queries_total", "operation" => operation, "outcome" => outcome).increment(1);
    histogram!("kv_store_query_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}
