//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rotator_probes_total` (counter): probes by outcome (healthy/unhealthy)
//! - `rotator_probe_duration_ms` (histogram): elapsed time from round start
//! - `rotator_healthy_candidates` (gauge): healthy candidates in the last round, per chain
//! - `rotator_rotations_total` (counter): active endpoint swaps, per chain
//! - `rotator_selection_failures_total` (counter): rounds with no healthy endpoint, per chain
//! - `rotator_active_endpoint` (gauge): 1 for the URL currently active, per chain
//! - `rotator_manager_state` (gauge): 0 initializing, 1 ready, 2 stopped, per chain
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use url::Url;

use crate::blockchain::types::ChainId;
use crate::rotation::ManagerState;

/// Install the Prometheus exporter with an HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_probe(healthy: bool, elapsed: Duration) {
    let outcome = if healthy { "healthy" } else { "unhealthy" };
    ::metrics::counter!("rotator_probes_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("rotator_probe_duration_ms").record(elapsed.as_secs_f64() * 1000.0);
}

pub fn record_healthy_candidates(chain_id: ChainId, count: usize) {
    ::metrics::gauge!("rotator_healthy_candidates", "chain_id" => chain_id.to_string()).set(count as f64);
}

pub fn record_rotation(chain_id: ChainId) {
    ::metrics::counter!("rotator_rotations_total", "chain_id" => chain_id.to_string()).increment(1);
}

pub fn record_selection_failure(chain_id: ChainId) {
    ::metrics::counter!("rotator_selection_failures_total", "chain_id" => chain_id.to_string()).increment(1);
}

/// Mark `url` active for `chain_id`, clearing the retired URL if any.
pub fn record_active_endpoint(chain_id: ChainId, url: &Url, previous: Option<&Url>) {
    if let Some(previous) = previous {
        ::metrics::gauge!(
            "rotator_active_endpoint",
            "chain_id" => chain_id.to_string(),
            "url" => previous.to_string()
        )
        .set(0.0);
    }
    ::metrics::gauge!(
        "rotator_active_endpoint",
        "chain_id" => chain_id.to_string(),
        "url" => url.to_string()
    )
    .set(1.0);
}

pub fn record_manager_state(chain_id: ChainId, state: ManagerState) {
    ::metrics::gauge!("rotator_manager_state", "chain_id" => chain_id.to_string()).set(state as u8 as f64);
}
