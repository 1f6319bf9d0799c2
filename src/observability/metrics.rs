//! Metrics collection and exposition.
//!
//! # Metrics
//! - `log_relay_records_total` (counter): records written to the sink
//! - `log_relay_deliveries_dropped_total` (counter): per-subscriber drops, by stage
//! - `log_relay_subscribers_pruned_total` (counter): closed subscribers removed by the sink
//! - `log_relay_subscribers` (gauge): currently registered subscribers
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus exporter is optional and only started by the binary

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_write() {
    counter!("log_relay_records_total").increment(1);
}

/// `stage` is `"live"`, `"replay"` or `"forward"`.
pub fn record_dropped(stage: &'static str, count: u64) {
    counter!("log_relay_deliveries_dropped_total", "stage" => stage).increment(count);
}

pub fn record_pruned(count: usize) {
    counter!("log_relay_subscribers_pruned_total").increment(count as u64);
}

pub fn record_subscriber_count(count: usize) {
    gauge!("log_relay_subscribers").set(count as f64);
}
