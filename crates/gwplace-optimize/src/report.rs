//! Optimization outcome.

use gwplace_network::Network;
use serde::{Deserialize, Serialize};

/// Final state of an optimizer run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    /// Optimizer that produced the result.
    pub optimizer: String,
    /// Iterations executed (meaning is optimizer-specific).
    pub iterations: usize,
    /// Gateways in the final configuration.
    pub gateways: usize,
    /// Gateways the optimizer inserted.
    pub gateways_added: usize,
    /// Connected end devices.
    pub connected: usize,
    /// End devices with no reachable gateway.
    pub unconnected: usize,
    /// Sum of link distances (meters).
    pub total_distance: f64,
    /// Whether every end device is connected.
    pub converged: bool,
}

impl OptimizationReport {
    /// Snapshot the statistics of a connected network.
    pub(crate) fn from_network(
        optimizer: &str,
        network: &Network,
        iterations: usize,
        gateways_added: usize,
    ) -> Self {
        Self {
            optimizer: optimizer.to_string(),
            iterations,
            gateways: network.num_gateways(),
            gateways_added,
            connected: network.connected_count(),
            unconnected: network.unconnected_count(),
            total_distance: network.total_distance(),
            converged: network.is_fully_connected(),
        }
    }
}
