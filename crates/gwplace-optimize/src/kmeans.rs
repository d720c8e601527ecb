//! K-means-like centroid relaxation.
//!
//! Two strategies share the same move primitive: a gateway steps toward the
//! centroid of the devices it serves and the network is re-evaluated after
//! every single move.
//!
//! - [`Strategy::FixedK`] sweeps `k = 1, 2, ...`, relaxing `k` random
//!   gateways each round until one round covers every device.
//! - [`Strategy::Incremental`] grows the gateway set one at a time, seeding
//!   each new gateway on the uncovered device farthest from any gateway.

use crate::placement::{self, AntennaHeight};
use crate::{OptimizationReport, Result};
use gwplace_common::{centroid, distance, BoundingBox, GeoPoint};
use gwplace_metrics::metric_defs::MOVES_REVERTED;
use gwplace_metrics::OPTIMIZER_LABEL;
use gwplace_network::Network;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const NAME: &str = "kmeans";

/// How gateways are introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Restart with `k` random gateways for increasing `k`.
    FixedK,
    /// Add gateways one at a time at the worst-served device.
    #[default]
    Incremental,
}

/// K-means optimizer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansConfig {
    pub strategy: Strategy,
    /// Relaxation rounds per `k` (fixed-k only).
    pub max_iterations: usize,
    /// Squared step (degrees²) at or below which a gateway is at rest (fixed-k only).
    pub min_speed: f64,
    /// Fraction of the way to the centroid moved per step (fixed-k only).
    pub acceleration: f64,
    /// Largest move (degrees) below which relaxation stops (incremental only).
    pub epsilon: f64,
    /// Relaxation rounds after each insertion (incremental only).
    pub relax_iterations: usize,
    /// Undo moves that shrink coverage.
    pub revert_regressions: bool,
    /// Height range for placed gateways.
    pub antenna: AntennaHeight,
    /// RNG seed.
    pub seed: u64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            max_iterations: 500,
            min_speed: 1e-5,
            acceleration: 0.05,
            epsilon: 1e-6,
            relax_iterations: 50,
            revert_regressions: true,
            antenna: AntennaHeight::default(),
            seed: crate::DEFAULT_SEED,
        }
    }
}

impl KMeansConfig {
    /// Default configuration for a strategy.
    pub fn with_strategy(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 || self.relax_iterations == 0 {
            return Err(placement::invalid(
                "max_iterations and relax_iterations must be at least 1",
            ));
        }
        if !(self.acceleration > 0.0 && self.acceleration <= 1.0) {
            return Err(placement::invalid(format!(
                "acceleration must be in (0, 1] (got {})",
                self.acceleration
            )));
        }
        if !(self.min_speed >= 0.0 && self.epsilon >= 0.0) {
            return Err(placement::invalid("min_speed and epsilon must be non-negative"));
        }
        self.antenna.validate()
    }
}

/// Centroid-relaxation optimizer over a borrowed network.
pub struct KMeansOptimizer<'a> {
    network: &'a mut Network,
    config: KMeansConfig,
    rng: ChaCha8Rng,
    bbox: BoundingBox,
}

impl<'a> KMeansOptimizer<'a> {
    pub fn new(network: &'a mut Network, config: KMeansConfig) -> Result<Self> {
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

    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }

    /// Replace the network's gateways with a relaxed, covering set.
    pub fn run(&mut self) -> OptimizationReport {
        let (iterations, added) = match self.config.strategy {
            Strategy::FixedK => self.run_fixed_k(),
            Strategy::Incremental => self.run_incremental(),
        };

        self.network.connect();
        let report = OptimizationReport::from_network(NAME, &*self.network, iterations, added);
        if report.converged {
            info!(iterations, gateways = report.gateways, "K-means converged");
        } else {
            warn!(
                iterations,
                unconnected = report.unconnected,
                "K-means finished without covering every end device"
            );
        }
        report
    }

    fn run_fixed_k(&mut self) -> (usize, usize) {
        let mut iterations = 0;
        let mut added = 0;

        for k in 1..=self.network.num_end_devices() {
            self.network.clear_gateways();
            for _ in 0..k {
                let p = placement::random_position(&mut self.rng, &self.bbox, &self.config.antenna);
                self.network.add_gateway(p);
                placement::record_gateway_added(NAME);
            }
            added += k;
            self.network.connect();

            for _ in 0..self.config.max_iterations {
                if self.network.is_fully_connected() {
                    break;
                }
                iterations += 1;
                placement::record_iteration(NAME);

                let mut max_speed: f64 = 0.0;
                for gw in 0..self.network.num_gateways() {
                    let Some(target) = self.served_centroid(gw) else {
                        continue;
                    };
                    let from = self.network.gateways()[gw].location;
                    let step = (target - from) * self.config.acceleration;
                    if self.move_gateway(gw, from + step) {
                        max_speed = max_speed.max(step.norm_squared());
                    }
                }

                debug!(
                    k,
                    max_speed,
                    connected = self.network.connected_count(),
                    "fixed-k relaxation step"
                );
                if max_speed <= self.config.min_speed {
                    break;
                }
            }

            if self.network.is_fully_connected() {
                break;
            }
            info!(
                k,
                unconnected = self.network.unconnected_count(),
                "k gateways insufficient, retrying with k + 1"
            );
        }

        (iterations, added)
    }

    fn run_incremental(&mut self) -> (usize, usize) {
        let mut iterations = 0;
        let mut added = 0;
        let mut used_as_seed = vec![false; self.network.num_end_devices()];

        self.network.clear_gateways();
        self.network.connect();

        while !self.network.is_fully_connected() {
            let Some(seed) = self.farthest_unconnected(&used_as_seed) else {
                break;
            };
            used_as_seed[seed] = true;

            let height = self.config.antenna.sample(&mut self.rng);
            let location = self.network.end_devices()[seed].location.with_alt(height);
            let idx = self.network.add_gateway(location);
            placement::record_gateway_added(NAME);
            added += 1;
            self.network.connect();
            info!(
                gateway = %self.network.gateways()[idx].id,
                device = %self.network.end_devices()[seed].id,
                connected = self.network.connected_count(),
                "Seeded gateway on farthest device"
            );

            for _ in 0..self.config.relax_iterations {
                iterations += 1;
                placement::record_iteration(NAME);

                let mut max_move: f64 = 0.0;
                for gw in 0..self.network.num_gateways() {
                    let Some(target) = self.served_centroid(gw) else {
                        continue;
                    };
                    let from = self.network.gateways()[gw].location;
                    if self.move_gateway(gw, target) {
                        max_move = max_move.max((target - from).norm());
                    }
                }

                debug!(
                    gateways = self.network.num_gateways(),
                    max_move,
                    connected = self.network.connected_count(),
                    "lloyd step"
                );
                if max_move < self.config.epsilon {
                    break;
                }
            }
        }

        (iterations, added)
    }

    /// Centroid of the devices a gateway serves, at the gateway's own height.
    fn served_centroid(&self, gw: usize) -> Option<GeoPoint> {
        let gateway = &self.network.gateways()[gw];
        let devices = self.network.end_devices();
        centroid(gateway.connected_devices().iter().map(|&d| &devices[d].location))
            .map(|c| c.with_alt(gateway.location.alt))
    }

    /// Unconnected, unused device farthest from its nearest gateway; ties go to the lowest index.
    fn farthest_unconnected(&self, used: &[bool]) -> Option<usize> {
        let gateways = self.network.gateways();
        let mut best: Option<(usize, f64)> = None;
        for idx in self.network.unconnected_devices() {
            if used[idx] {
                continue;
            }
            let loc = &self.network.end_devices()[idx].location;
            let nearest = gateways
                .iter()
                .map(|g| distance::squared_distance(&g.location, loc))
                .fold(f64::INFINITY, f64::min);
            if best.map_or(true, |(_, d)| nearest > d) {
                best = Some((idx, nearest));
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Move a gateway and re-evaluate. Returns `false` if the move was undone
    /// because it lost devices for this gateway or for the network.
    fn move_gateway(&mut self, gw: usize, to: GeoPoint) -> bool {
        let from = self.network.gateways()[gw].location;
        let served_before = self.network.gateways()[gw].num_connected();
        let connected_before = self.network.connected_count();

        self.network.set_gateway_location(gw, to);
        self.network.connect();

        let regressed = self.network.gateways()[gw].num_connected() < served_before
            || self.network.connected_count() < connected_before;
        if self.config.revert_regressions && regressed {
            self.network.set_gateway_location(gw, from);
            self.network.connect();
            metrics::counter!(MOVES_REVERTED.name, OPTIMIZER_LABEL => NAME).increment(1);
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OptimizeError;
    use gwplace_dem::ElevationGrid;
    use gwplace_link::LinkParams;
    use std::sync::Arc;

    fn flat_network(max_range_m: f64) -> Network {
        let grid = ElevationGrid::from_points(&[
            (0.0, 0.0, 0.0),
            (0.0, 0.1, 0.0),
            (0.1, 0.0, 0.0),
            (0.1, 0.1, 0.0),
        ])
        .unwrap();
        Network::new(Arc::new(grid), LinkParams::with_max_range(max_range_m)).unwrap()
    }

    #[test]
    fn test_validate() {
        assert!(KMeansConfig::default().validate().is_ok());
        let config = KMeansConfig {
            acceleration: 0.0,
            ..KMeansConfig::default()
        };
        assert!(matches!(config.validate(), Err(OptimizeError::InvalidConfig(_))));
    }

    #[test]
    fn test_strategy_names() {
        let config: KMeansConfig = serde_yaml::from_str("strategy: fixed_k\n").unwrap();
        assert_eq!(config.strategy, Strategy::FixedK);
        assert_eq!(config.acceleration, 0.05);
        assert_eq!(KMeansConfig::default().strategy, Strategy::Incremental);
    }

    #[test]
    fn test_farthest_unconnected_prefers_lowest_index_without_gateways() {
        let mut net = flat_network(2000.0);
        net.add_end_device("a", GeoPoint::new(0.01, 0.01, 0.0));
        net.add_end_device("b", GeoPoint::new(0.09, 0.09, 0.0));
        net.connect();
        let opt = KMeansOptimizer::new(&mut net, KMeansConfig::default()).unwrap();
        assert_eq!(opt.farthest_unconnected(&[false, false]), Some(0));
        assert_eq!(opt.farthest_unconnected(&[true, false]), Some(1));
        assert_eq!(opt.farthest_unconnected(&[true, true]), None);
    }

    #[test]
    fn test_farthest_unconnected_measures_to_nearest_gateway() {
        let mut net = flat_network(500.0);
        net.add_gateway(GeoPoint::new(0.05, 0.05, 5.0));
        net.add_end_device("near", GeoPoint::new(0.05, 0.06, 0.0));
        net.add_end_device("far", GeoPoint::new(0.05, 0.09, 0.0));
        net.connect();
        assert_eq!(net.connected_count(), 0);
        let opt = KMeansOptimizer::new(&mut net, KMeansConfig::default()).unwrap();
        assert_eq!(opt.farthest_unconnected(&[false, false]), Some(1));
    }

    #[test]
    fn test_move_that_loses_devices_is_reverted() {
        let mut net = flat_network(2000.0);
        net.add_gateway(GeoPoint::new(0.05, 0.05, 5.0));
        net.add_end_device("a", GeoPoint::new(0.05, 0.051, 0.0));
        net.connect();

        let mut opt = KMeansOptimizer::new(&mut net, KMeansConfig::default()).unwrap();
        assert!(!opt.move_gateway(0, GeoPoint::new(0.09, 0.09, 5.0)));
        assert_eq!(opt.network().gateways()[0].location, GeoPoint::new(0.05, 0.05, 5.0));
        assert_eq!(opt.network().connected_count(), 1);

        assert!(opt.move_gateway(0, GeoPoint::new(0.05, 0.052, 5.0)));
        assert_eq!(opt.network().connected_count(), 1);
    }

    #[test]
    fn test_move_kept_when_guard_disabled() {
        let mut net = flat_network(2000.0);
        net.add_gateway(GeoPoint::new(0.05, 0.05, 5.0));
        net.add_end_device("a", GeoPoint::new(0.05, 0.051, 0.0));
        net.connect();

        let config = KMeansConfig {
            revert_regressions: false,
            ..KMeansConfig::default()
        };
        let mut opt = KMeansOptimizer::new(&mut net, config).unwrap();
        assert!(opt.move_gateway(0, GeoPoint::new(0.09, 0.09, 5.0)));
        assert_eq!(opt.network().connected_count(), 0);
    }

    #[test]
    fn test_incremental_covers_clusters() {
        let mut net = flat_network(1500.0);
        for (i, (lat, lng)) in [(0.01, 0.01), (0.011, 0.012), (0.09, 0.09), (0.089, 0.091), (0.01, 0.09)]
            .into_iter()
            .enumerate()
        {
            net.add_end_device(format!("d{}", i), GeoPoint::new(lat, lng, 1.0));
        }
        let report = KMeansOptimizer::new(&mut net, KMeansConfig::default())
            .unwrap()
            .run();
        assert!(report.converged);
        assert_eq!(report.connected, 5);
        assert!(report.gateways <= 5);
        assert_eq!(report.gateways, report.gateways_added);
        assert!(net.assignments_consistent());
    }
}
