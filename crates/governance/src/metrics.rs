//! Metrics implementation using Prometheus.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;
use deepfish_core::{Error, Result};

/// Install the Prometheus recorder with its own HTTP listener on `addr`.
///
/// The exporter runs beside the bridge rather than as a bridge route, since
/// every GET on the bridge port is a liveness probe.
pub fn setup_metrics_exporter(addr: SocketAddr) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| Error::config(format!("Failed to install Prometheus exporter: {}", e)))?;

    tracing::info!(addr = %addr, "Prometheus metrics exporter listening");
    Ok(())
}

/// Helper to track HTTP request metrics (latency, count).
pub fn track_request(method: &str, path: &str, status: u16, latency_sec: f64) {
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(latency_sec);
}
