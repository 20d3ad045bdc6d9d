//! Metrics collection and exposition.
//!
//! # Metrics
//! - `fakeapi_requests_total` (counter): served requests by scheme, method, status
//! - `fakeapi_request_duration_seconds` (histogram): latency including simulated delay
//! - `fakeapi_bindings_total` (counter): dynamic fields applied / skipped
//! - `fakeapi_webhooks_total` (counter): captured webhooks
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(scheme: &'static str, method: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        "fakeapi_requests_total",
        "scheme" => scheme,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("fakeapi_request_duration_seconds", "scheme" => scheme)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_bindings(applied: usize, skipped: usize) {
    ::metrics::counter!("fakeapi_bindings_total", "outcome" => "applied").increment(applied as u64);
    ::metrics::counter!("fakeapi_bindings_total", "outcome" => "skipped").increment(skipped as u64);
}

pub fn record_webhook() {
    ::metrics::counter!("fakeapi_webhooks_total").increment(1);
}
