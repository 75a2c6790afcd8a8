//! Metrics collection and exposition.
//!
//! # Metrics
//! - `doh_gateway_requests_total` (counter): requests by method, route, status
//! - `doh_gateway_request_duration_seconds` (histogram): dispatch latency by route
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one dispatched request.
pub fn record_request(method: &str, status: u16, route: &'static str, start: Instant) {
    metrics::counter!(
        "doh_gateway_requests_total",
        "method" => method.to_string(),
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("doh_gateway_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}
