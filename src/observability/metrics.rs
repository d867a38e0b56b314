//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): inbound requests by method, status, route
//! - `gateway_request_duration_seconds` (histogram): inbound latency
//! - `gateway_upstream_attempts_total` (counter): outbound calls by service, result
//! - `gateway_upstream_attempt_duration_seconds` (histogram): outbound call latency
//! - `gateway_dns_resolvable` (gauge): 1=resolvable, 0=not yet
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics recorder"),
    }
}

pub fn record_request(method: &str, status: u16, route: &'static str, start: Instant) {
    let (method, status) = (method.to_string(), status.to_string());
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.clone(),
        "status" => status.clone(),
        "route" => route
    )
    .increment(1);
    metrics::histogram!(
        "gateway_request_duration_seconds",
        "method" => method,
        "status" => status,
        "route" => route
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_attempt(service: &str, result: &'static str, start: Instant) {
    let service = service.to_string();
    metrics::counter!("gateway_upstream_attempts_total", "service" => service.clone(), "result" => result)
        .increment(1);
    metrics::histogram!("gateway_upstream_attempt_duration_seconds", "service" => service, "result" => result)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_dns(host: &str, resolvable: bool) {
    metrics::gauge!("gateway_dns_resolvable", "host" => host.to_string())
        .set(if resolvable { 1.0 } else { 0.0 });
}
