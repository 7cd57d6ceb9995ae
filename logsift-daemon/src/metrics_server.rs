//! Prometheus metrics HTTP server.
//!
//! Uses the built-in HTTP listener from `metrics-exporter-prometheus`.
//! Every path on the listener serves the scrape output.
//!
//! # Usage
//!
//! ```ignore
//! let config = MetricsConfig::default();
//! install_metrics_recorder(&config)?;
//! // From here on, metrics::counter!() and friends record to Prometheus.
//! ```

use std::net::SocketAddr;

use anyhow::Result;
use logsift_core::config::MetricsConfig;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Parse `listen_addr:port` into a socket address.
pub fn listen_socket_addr(config: &MetricsConfig) -> Result<SocketAddr> {
    let ip = config
        .listen_addr
        .parse::<std::net::IpAddr>()
        .map_err(|e| anyhow::anyhow!("invalid metrics listen address '{}': {e}", config.listen_addr))?;
    Ok(SocketAddr::new(ip, config.port))
}

/// Install the global metrics recorder and start the HTTP listener.
///
/// Call once per process, before any component records metrics.
///
/// # Errors
///
/// - The listen address does not parse
/// - A global recorder is already installed or the listener cannot bind
pub fn install_metrics_recorder(config: &MetricsConfig) -> Result<()> {
    let addr = listen_socket_addr(config)?;

    if addr.ip().is_unspecified() {
        tracing::warn!(
            listen_addr = %addr,
            "metrics endpoint is exposed on all interfaces; restrict listen_addr in untrusted networks"
        );
    }

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("failed to install metrics recorder: {e}"))?;

    logsift_core::metrics::describe_all();

    tracing::info!(listen_addr = %addr, "Prometheus metrics endpoint active");
    Ok(())
}
