//! Metrics collection and exposition.
//!
//! # Metrics
//! - `kb_gateway_requests_total` (counter): responses by endpoint, status
//! - `kb_gateway_request_duration_seconds` (histogram): handler latency
//! - `kb_gateway_cache_total` (counter): cache lookups by endpoint, result
//! - `kb_gateway_upstream_retries_total` (counter): retries by endpoint
//! - `kb_gateway_degraded_total` (counter): degraded responses by endpoint
//! - `kb_gateway_rate_limited_total` (counter): rejected requests
//! - `kb_gateway_rate_limit_keys` (gauge): tracked client keys
//!
//! Without an installed recorder every call is a no-op.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(endpoint: &'static str, status: u16, start: Instant) {
    counter!("kb_gateway_requests_total", "endpoint" => endpoint, "status" => status.to_string())
        .increment(1);
    histogram!("kb_gateway_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_cache(endpoint: &'static str, hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("kb_gateway_cache_total", "endpoint" => endpoint, "result" => result).increment(1);
}

pub fn record_retry(endpoint: &'static str) {
    counter!("kb_gateway_upstream_retries_total", "endpoint" => endpoint).increment(1);
}

pub fn record_degraded(endpoint: &'static str) {
    counter!("kb_gateway_degraded_total", "endpoint" => endpoint).increment(1);
}

pub fn record_rate_limited(endpoint: &'static str) {
    counter!("kb_gateway_rate_limited_total", "endpoint" => endpoint).increment(1);
}

pub fn record_rate_limit_keys(count: usize) {
    gauge!("kb_gateway_rate_limit_keys").set(count as f64);
}
