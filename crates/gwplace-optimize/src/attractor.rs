//! Force-directed (attractor) gateway placement.
//!
//! Every end device pulls on gateways: a device served by a gateway pulls it
//! with weight `1 / num_end_devices`, an unconnected device pulls every
//! gateway with weight `1 / num_unconnected`. Gateways move by their net force
//! each iteration. When the mean force stays below a threshold, or the
//! connected count fails to improve, for a number of iterations while devices
//! remain uncovered, a new gateway is inserted at the centroid of the
//! uncovered devices. If a gateway there would reach none of
//! them (e.g. two far-apart clusters), it goes on the uncovered device that
//! can see the most other uncovered devices instead.

use crate::placement::{self, AntennaHeight};
use crate::{OptimizationReport, Result};
use gwplace_common::{centroid, BoundingBox, GeoPoint};
use gwplace_network::Network;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const NAME: &str = "attractor";

/// Attractor optimizer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttractorConfig {
    /// Iteration budget.
    pub max_iterations: usize,
    /// Mean force magnitude (degrees) below which an iteration counts as stagnant.
    pub stagnation_threshold: f64,
    /// Consecutive stagnant iterations, or iterations without a new best
    /// connected count, before a gateway is inserted.
    pub stagnation_patience: usize,
    /// Maximum gateways the optimizer may insert, including the initial seed.
    pub max_gateways_to_add: usize,
    /// Height range for inserted gateways.
    pub antenna: AntennaHeight,
    /// RNG seed.
    pub seed: u64,
}

impl Default for AttractorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            stagnation_threshold: 0.01,
            stagnation_patience: 10,
            max_gateways_to_add: 10,
            antenna: AntennaHeight::default(),
            seed: crate::DEFAULT_SEED,
        }
    }
}

impl AttractorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(placement::invalid("max_iterations must be at least 1"));
        }
        if !(self.stagnation_threshold.is_finite() && self.stagnation_threshold >= 0.0) {
            return Err(placement::invalid(format!(
                "stagnation_threshold must be a non-negative number (got {})",
                self.stagnation_threshold
            )));
        }
        if self.stagnation_patience == 0 {
            return Err(placement::invalid("stagnation_patience must be at least 1"));
        }
        self.antenna.validate()
    }
}

/// Force-directed optimizer over a borrowed network.
pub struct AttractorOptimizer<'a> {
    network: &'a mut Network,
    config: AttractorConfig,
    rng: ChaCha8Rng,
    bbox: BoundingBox,
}

impl<'a> AttractorOptimizer<'a> {
    pub fn new(network: &'a mut Network, config: AttractorConfig) -> Result<Self> {
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

    pub fn config(&self) -> &AttractorConfig {
        &self.config
    }

    /// Run until every device is covered or a budget runs out.
    pub fn run(&mut self) -> OptimizationReport {
        let mut added = 0;
        if self.network.num_gateways() == 0 {
            let p = placement::random_position(&mut self.rng, &self.bbox, &self.config.antenna);
            self.network.add_gateway(p);
            placement::record_gateway_added(NAME);
            added += 1;
        }

        let mut iterations = 0;
        let mut stagnant = 0;
        let mut best_connected = 0;
        let mut since_improvement = 0;
        while iterations < self.config.max_iterations {
            iterations += 1;
            placement::record_iteration(NAME);

            let connected = self.network.connect();
            if self.network.is_fully_connected() {
                info!(iterations, gateways = self.network.num_gateways(), "Attractor converged");
                break;
            }
            // Gateways chasing uncovered devices in lockstep keep a high
            // velocity without ever covering more of them.
            if connected > best_connected {
                best_connected = connected;
                since_improvement = 0;
            } else {
                since_improvement += 1;
            }

            let forces = self.forces();
            for (idx, force) in forces.iter().enumerate() {
                self.network.translate_gateway(idx, *force);
            }
            let velocity = forces.iter().map(GeoPoint::norm).sum::<f64>() / forces.len() as f64;

            debug!(
                iteration = iterations,
                velocity,
                connected = self.network.connected_count(),
                unconnected = self.network.unconnected_count(),
                gateways = self.network.num_gateways(),
                "attractor step"
            );

            if velocity < self.config.stagnation_threshold {
                stagnant += 1;
            } else {
                stagnant = 0;
            }

            let patience = self.config.stagnation_patience;
            if stagnant >= patience || since_improvement >= patience {
                if added >= self.config.max_gateways_to_add {
                    info!(iterations, added, "Attractor stagnated with gateway budget exhausted");
                    break;
                }
                // Assignments still describe the positions before this step's moves.
                self.network.connect();
                if self.network.is_fully_connected() {
                    info!(iterations, gateways = self.network.num_gateways(), "Attractor converged");
                    break;
                }
                let location = self.insertion_point();
                let idx = self.network.add_gateway(location);
                placement::record_gateway_added(NAME);
                added += 1;
                stagnant = 0;
                since_improvement = 0;
                info!(
                    gateway = %self.network.gateways()[idx].id,
                    lat = location.lat,
                    lng = location.lng,
                    "Inserted gateway"
                );
            }
        }

        self.network.connect();
        let report = OptimizationReport::from_network(NAME, &*self.network, iterations, added);
        if !report.converged {
            warn!(
                iterations,
                unconnected = report.unconnected,
                "Attractor finished without covering every end device"
            );
        }
        report
    }

    /// Net force on each gateway, computed in parallel over a read-only network.
    fn forces(&self) -> Vec<GeoPoint> {
        let network: &Network = &*self.network;
        let devices = network.end_devices();
        let own_weight = 1.0 / devices.len() as f64;
        let unconnected = network.unconnected_count();
        let free_weight = if unconnected > 0 {
            1.0 / unconnected as f64
        } else {
            0.0
        };

        network
            .gateways()
            .par_iter()
            .enumerate()
            .map(|(gw_idx, gw)| {
                let mut force = GeoPoint::default();
                for dev in devices {
                    let weight = match dev.assigned_gateway() {
                        Some(g) if g == gw_idx => own_weight,
                        Some(_) => continue,
                        None => free_weight,
                    };
                    force += (dev.location - gw.location) * weight;
                }
                force
            })
            .collect()
    }

    /// Where to put the next gateway: the jittered centroid of the unconnected
    /// devices if it reaches any of them, else the densest unconnected device,
    /// else a random position.
    fn insertion_point(&mut self) -> GeoPoint {
        let antenna = AntennaHeight::fixed(self.config.antenna.sample(&mut self.rng));
        let unconnected: Vec<usize> = self.network.unconnected_devices().collect();
        let devices = self.network.end_devices();

        let Some(center) = centroid(unconnected.iter().map(|&i| &devices[i].location)) else {
            return placement::random_position(&mut self.rng, &self.bbox, &antenna);
        };
        let candidate = placement::jittered(&mut self.rng, &center, &antenna);
        if self.reachable(&candidate, &unconnected) > 0 {
            return candidate;
        }

        debug!("centroid reaches no unconnected device, using densest device");
        match self.densest(antenna.min_m, &unconnected) {
            Some(p) => p,
            None => placement::random_position(&mut self.rng, &self.bbox, &antenna),
        }
    }

    /// How many of `devices` a gateway at `location` could serve.
    fn reachable(&self, location: &GeoPoint, devices: &[usize]) -> usize {
        let network: &Network = &*self.network;
        let grid = network.grid().as_ref();
        let params = network.params();
        let all = network.end_devices();
        devices
            .iter()
            .filter(|&&i| params.evaluate(grid, location, &all[i].location).is_some())
            .count()
    }

    /// Location of the device in `devices` from which a gateway at `height`
    /// reaches the most of them; ties go to the lowest index.
    fn densest(&self, height: f64, devices: &[usize]) -> Option<GeoPoint> {
        let all = self.network.end_devices();
        let counts: Vec<usize> = devices
            .par_iter()
            .map(|&i| self.reachable(&all[i].location.with_alt(height), devices))
            .collect();

        let mut best: Option<(usize, usize)> = None;
        for (&i, &count) in devices.iter().zip(&counts) {
            if count > 0 && best.map_or(true, |(_, c)| count > c) {
                best = Some((i, count));
            }
        }
        best.map(|(i, _)| all[i].location.with_alt(height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OptimizeError, JITTER_DEG};
    use approx::assert_abs_diff_eq;
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
    fn test_rejects_empty_network() {
        let mut net = flat_network(2000.0);
        let err = AttractorOptimizer::new(&mut net, AttractorConfig::default()).err();
        assert_eq!(err, Some(OptimizeError::NoEndDevices));
    }

    #[test]
    fn test_rejects_bad_config() {
        let mut net = flat_network(2000.0);
        net.add_end_device("a", GeoPoint::new(0.05, 0.05, 0.0));
        let config = AttractorConfig {
            stagnation_patience: 0,
            ..AttractorConfig::default()
        };
        assert!(matches!(
            AttractorOptimizer::new(&mut net, config).err(),
            Some(OptimizeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_single_device_is_covered_immediately() {
        let mut net = flat_network(50_000.0);
        net.add_end_device("a", GeoPoint::new(0.05, 0.05, 0.0));
        let report = AttractorOptimizer::new(&mut net, AttractorConfig::default())
            .unwrap()
            .run();
        assert!(report.converged);
        assert_eq!(report.iterations, 1);
        assert_eq!(report.gateways, 1);
        assert_eq!(report.gateways_added, 1);
    }

    #[test]
    fn test_keeps_existing_gateways() {
        let mut net = flat_network(50_000.0);
        net.add_gateway_with_id("fixed", GeoPoint::new(0.02, 0.02, 5.0));
        net.add_end_device("a", GeoPoint::new(0.05, 0.05, 0.0));
        let report = AttractorOptimizer::new(&mut net, AttractorConfig::default())
            .unwrap()
            .run();
        assert_eq!(report.gateways_added, 0);
        assert_eq!(net.gateways()[0].id, "fixed");
    }

    #[test]
    fn test_unconnected_devices_pull_gateway() {
        let mut net = flat_network(100.0);
        net.add_gateway(GeoPoint::new(0.01, 0.01, 5.0));
        net.add_end_device("a", GeoPoint::new(0.05, 0.05, 0.0));
        net.add_end_device("b", GeoPoint::new(0.07, 0.05, 0.0));
        net.connect();

        let opt = AttractorOptimizer::new(&mut net, AttractorConfig::default()).unwrap();
        let forces = opt.forces();
        assert_eq!(forces.len(), 1);
        // Both devices unconnected: the force points at their centroid.
        assert_abs_diff_eq!(forces[0].lat, 0.05, epsilon = 1e-12);
        assert_abs_diff_eq!(forces[0].lng, 0.04, epsilon = 1e-12);
        assert_eq!(forces[0].alt, 0.0);
    }

    #[test]
    fn test_insertion_avoids_empty_midpoint() {
        let mut net = flat_network(2000.0);
        net.add_gateway(GeoPoint::new(0.09, 0.09, 5.0));
        net.add_end_device("a", GeoPoint::new(0.05, 0.02, 0.0));
        net.add_end_device("b", GeoPoint::new(0.05, 0.065, 0.0));
        net.connect();
        assert_eq!(net.connected_count(), 0);

        let config = AttractorConfig {
            antenna: AntennaHeight::fixed(3.0),
            ..AttractorConfig::default()
        };
        let mut opt = AttractorOptimizer::new(&mut net, config).unwrap();
        // The midpoint is ~2.5 km from both devices.
        assert_eq!(opt.insertion_point(), GeoPoint::new(0.05, 0.02, 3.0));
    }

    #[test]
    fn test_insertion_at_centroid_of_cluster() {
        let mut net = flat_network(2000.0);
        net.add_gateway(GeoPoint::new(0.09, 0.09, 5.0));
        net.add_end_device("a", GeoPoint::new(0.05, 0.02, 0.0));
        net.add_end_device("b", GeoPoint::new(0.05, 0.022, 0.0));
        net.connect();

        let mut opt = AttractorOptimizer::new(&mut net, AttractorConfig::default()).unwrap();
        let p = opt.insertion_point();
        assert!((p.lat - 0.05).abs() <= JITTER_DEG);
        assert!((p.lng - 0.021).abs() <= JITTER_DEG);
        assert!((2.0..=10.0).contains(&p.alt));
    }

    #[test]
    fn test_devices_of_other_gateways_exert_no_force() {
        let mut net = flat_network(2000.0);
        net.add_gateway(GeoPoint::new(0.05, 0.05, 5.0));
        net.add_gateway(GeoPoint::new(0.09, 0.09, 5.0));
        net.add_end_device("a", GeoPoint::new(0.05, 0.051, 0.0));
        net.add_end_device("b", GeoPoint::new(0.09, 0.091, 0.0));
        net.connect();
        assert!(net.is_fully_connected());

        let opt = AttractorOptimizer::new(&mut net, AttractorConfig::default()).unwrap();
        let forces = opt.forces();
        // Each gateway only feels its own device at weight 1/2.
        assert_abs_diff_eq!(forces[0].lng, 0.0005, epsilon = 1e-12);
        assert_abs_diff_eq!(forces[0].lat, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(forces[1].lng, 0.0005, epsilon = 1e-12);
    }
}
