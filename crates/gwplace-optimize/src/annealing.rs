//! Simulated annealing over gateway positions.
//!
//! The energy is the connected-device count. A proposal teleports one random
//! gateway to a random point in the end-device bounding box; improvements are
//! always kept, anything else is kept with probability
//! `exp((connected - best_connected) / temperature)`. The best configuration
//! seen is restored at the end.

use crate::placement::{self, AntennaHeight};
use crate::{OptimizationReport, Result};
use gwplace_common::BoundingBox;
use gwplace_metrics::metric_defs::{MOVES_ACCEPTED, MOVES_REVERTED};
use gwplace_metrics::OPTIMIZER_LABEL;
use gwplace_network::{Gateway, Network};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const NAME: &str = "annealing";

/// Annealing schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealingConfig {
    /// Starting temperature.
    pub initial_temp: f64,
    /// The run ends once the temperature is no longer above this.
    pub final_temp: f64,
    /// Geometric cooling factor, `0 < alpha < 1`.
    pub alpha: f64,
    /// Proposals evaluated at each temperature.
    pub iterations_per_temp: usize,
    /// Random gateways seeded when the network has none.
    pub initial_gateways: usize,
    /// Height range for placed gateways.
    pub antenna: AntennaHeight,
    /// RNG seed.
    pub seed: u64,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temp: 100.0,
            final_temp: 0.1,
            alpha: 0.95,
            iterations_per_temp: 100,
            initial_gateways: 1,
            antenna: AntennaHeight::default(),
            seed: crate::DEFAULT_SEED,
        }
    }
}

impl AnnealingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(placement::invalid(format!(
                "alpha must be in (0, 1) (got {})",
                self.alpha
            )));
        }
        if !(self.initial_temp > 0.0 && self.final_temp > 0.0)
            || !(self.initial_temp.is_finite() && self.final_temp.is_finite())
        {
            return Err(placement::invalid(format!(
                "temperatures must be positive (got {} -> {})",
                self.initial_temp, self.final_temp
            )));
        }
        if self.iterations_per_temp == 0 {
            return Err(placement::invalid("iterations_per_temp must be at least 1"));
        }
        if self.initial_gateways == 0 {
            return Err(placement::invalid("initial_gateways must be at least 1"));
        }
        self.antenna.validate()
    }
}

/// Simulated annealing optimizer over a borrowed network.
pub struct AnnealingOptimizer<'a> {
    network: &'a mut Network,
    config: AnnealingConfig,
    rng: ChaCha8Rng,
    bbox: BoundingBox,
}

impl<'a> AnnealingOptimizer<'a> {
    pub fn new(network: &'a mut Network, config: AnnealingConfig) -> Result<Self> {
        config.validate()?;
        let bbox = placement::device_bounds(network)?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(Self {
            network,
            config,
            rng,
            bbox,
        })
    }

    pub fn network(&self) -> &Network {
        &*self.network
    }

    pub fn config(&self) -> &AnnealingConfig {
        &self.config
    }

    /// Anneal and leave the best configuration found in the network.
    pub fn run(&mut self) -> OptimizationReport {
        let mut added = 0;
        if self.network.num_gateways() == 0 {
            for _ in 0..self.config.initial_gateways {
                let p = placement::random_position(&mut self.rng, &self.bbox, &self.config.antenna);
                self.network.add_gateway(p);
                placement::record_gateway_added(NAME);
            }
            added = self.config.initial_gateways;
        }

        let total = self.network.num_end_devices();
        let mut current = self.network.connect();
        let mut best = current;
        let mut best_gateways: Vec<Gateway> = self.network.gateways().to_vec();

        let mut temp = self.config.initial_temp;
        let mut iterations = 0;
        'cooling: while temp > self.config.final_temp {
            for _ in 0..self.config.iterations_per_temp {
                if best == total {
                    break 'cooling;
                }
                iterations += 1;
                placement::record_iteration(NAME);

                let gw = self.rng.gen_range(0..self.network.num_gateways());
                let previous = self.network.gateways()[gw].location;
                let proposal =
                    placement::random_position(&mut self.rng, &self.bbox, &self.config.antenna);
                self.network.set_gateway_location(gw, proposal);
                let connected = self.network.connect();

                let accept = connected > current || {
                    let p = ((connected as f64 - best as f64) / temp).exp();
                    self.rng.gen::<f64>() < p
                };

                if accept {
                    current = connected;
                    metrics::counter!(MOVES_ACCEPTED.name, OPTIMIZER_LABEL => NAME).increment(1);
                    if connected > best {
                        best = connected;
                        best_gateways = self.network.gateways().to_vec();
                        debug!(iteration = iterations, temp, best, "new best configuration");
                    }
                } else {
                    self.network.set_gateway_location(gw, previous);
                    self.network.connect();
                    metrics::counter!(MOVES_REVERTED.name, OPTIMIZER_LABEL => NAME).increment(1);
                }
            }
            temp *= self.config.alpha;
            debug!(temp, current, best, "cooled");
        }

        self.network.set_gateways(best_gateways);
        self.network.connect();

        let report = OptimizationReport::from_network(NAME, &*self.network, iterations, added);
        if report.converged {
            info!(iterations, gateways = report.gateways, "Annealing covered every end device");
        } else {
            warn!(
                iterations,
                unconnected = report.unconnected,
                "Annealing finished without covering every end device"
            );
        }
        report
    }
}
