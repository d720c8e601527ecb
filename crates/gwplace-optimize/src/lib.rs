//! # gwplace-optimize
//!
//! Gateway placement optimizers.
//!
//! Every optimizer borrows a [`Network`] mutably, moves or inserts gateways,
//! and uses [`Network::connect`] as its fitness oracle. Each one owns a
//! `ChaCha8Rng` seeded from its configuration, so a run is reproducible from
//! `(network, config)` alone.
//!
//! | Optimizer | Movement policy |
//! |-----------|-----------------|
//! | [`AttractorOptimizer`] | Force-directed pull toward served and uncovered devices, gateway insertion on stagnation |
//! | [`KMeansOptimizer`] | Centroid relaxation, fixed-k sweep or incremental farthest-device seeding |
//! | [`AnnealingOptimizer`] | Random teleports accepted on the connected-device count |
//!
//! Running out of budget is not an error: [`OptimizationReport::converged`]
//! is `false` and the network holds the best state reached.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use gwplace_common::GeoPoint;
//! use gwplace_dem::ElevationGrid;
//! use gwplace_link::LinkParams;
//! use gwplace_network::Network;
//! use gwplace_optimize::{Optimizer, OptimizerConfig};
//!
//! let grid = ElevationGrid::from_points(&[
//!     (0.0, 0.0, 0.0),
//!     (0.0, 0.1, 0.0),
//!     (0.1, 0.0, 0.0),
//!     (0.1, 0.1, 0.0),
//! ])?;
//! let mut net = Network::new(Arc::new(grid), LinkParams::default())?;
//! net.add_end_device("a", GeoPoint::new(0.02, 0.02, 1.0));
//! net.add_end_device("b", GeoPoint::new(0.08, 0.08, 1.0));
//!
//! let config: OptimizerConfig = serde_yaml::from_str("kind: kmeans\nseed: 7\n")?;
//! let report = Optimizer::new(&mut net, config)?.run();
//! assert!(report.converged);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod annealing;
mod attractor;
mod error;
mod kmeans;
mod placement;
mod report;

pub use annealing::{AnnealingConfig, AnnealingOptimizer};
pub use attractor::{AttractorConfig, AttractorOptimizer};
pub use error::OptimizeError;
pub use kmeans::{KMeansConfig, KMeansOptimizer, Strategy};
pub use placement::{jittered, random_position, AntennaHeight, JITTER_DEG};
pub use report::OptimizationReport;

use gwplace_network::Network;
use serde::{Deserialize, Serialize};

/// Result type for optimizer construction.
pub type Result<T> = std::result::Result<T, OptimizeError>;

/// Seed used when a configuration does not name one.
pub const DEFAULT_SEED: u64 = 42;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for any optimizer, tagged by `kind`.
///
/// ```
/// use gwplace_optimize::OptimizerConfig;
///
/// let config: OptimizerConfig =
///     serde_yaml::from_str("kind: annealing\nalpha: 0.9\nseed: 3\n").unwrap();
/// assert_eq!(config.name(), "annealing");
/// assert_eq!(config.seed(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OptimizerConfig {
    Attractor(AttractorConfig),
    KMeans(KMeansConfig),
    Annealing(AnnealingConfig),
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig::Attractor(AttractorConfig::default())
    }
}

impl OptimizerConfig {
    /// Default configuration for a name accepted on the command line.
    ///
    /// `clustering` selects k-means with the fixed-k sweep.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "attractor" => Some(OptimizerConfig::Attractor(AttractorConfig::default())),
            "kmeans" => Some(OptimizerConfig::KMeans(KMeansConfig::default())),
            "clustering" => Some(OptimizerConfig::KMeans(KMeansConfig::with_strategy(
                Strategy::FixedK,
            ))),
            "annealing" => Some(OptimizerConfig::Annealing(AnnealingConfig::default())),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OptimizerConfig::Attractor(_) => "attractor",
            OptimizerConfig::KMeans(_) => "kmeans",
            OptimizerConfig::Annealing(_) => "annealing",
        }
    }

    pub fn seed(&self) -> u64 {
        match self {
            OptimizerConfig::Attractor(c) => c.seed,
            OptimizerConfig::KMeans(c) => c.seed,
            OptimizerConfig::Annealing(c) => c.seed,
        }
    }

    pub fn set_seed(&mut self, seed: u64) {
        match self {
            OptimizerConfig::Attractor(c) => c.seed = seed,
            OptimizerConfig::KMeans(c) => c.seed = seed,
            OptimizerConfig::Annealing(c) => c.seed = seed,
        }
    }

    /// Override the main iteration budget.
    ///
    /// For annealing this is the number of proposals per temperature.
    pub fn set_max_iterations(&mut self, iterations: usize) {
        match self {
            OptimizerConfig::Attractor(c) => c.max_iterations = iterations,
            OptimizerConfig::KMeans(c) => c.max_iterations = iterations,
            OptimizerConfig::Annealing(c) => c.iterations_per_temp = iterations,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            OptimizerConfig::Attractor(c) => c.validate(),
            OptimizerConfig::KMeans(c) => c.validate(),
            OptimizerConfig::Annealing(c) => c.validate(),
        }
    }
}

// ============================================================================
// Optimizer
// ============================================================================

/// Any optimizer, bound to a network.
pub enum Optimizer<'a> {
    Attractor(AttractorOptimizer<'a>),
    KMeans(KMeansOptimizer<'a>),
    Annealing(AnnealingOptimizer<'a>),
}

impl<'a> Optimizer<'a> {
    /// Validate `config` against `network` and build the optimizer.
    pub fn new(network: &'a mut Network, config: OptimizerConfig) -> Result<Self> {
        Ok(match config {
            OptimizerConfig::Attractor(c) => Optimizer::Attractor(AttractorOptimizer::new(network, c)?),
            OptimizerConfig::KMeans(c) => Optimizer::KMeans(KMeansOptimizer::new(network, c)?),
            OptimizerConfig::Annealing(c) => {
                Optimizer::Annealing(AnnealingOptimizer::new(network, c)?)
            }
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Optimizer::Attractor(_) => "attractor",
            Optimizer::KMeans(_) => "kmeans",
            Optimizer::Annealing(_) => "annealing",
        }
    }

    pub fn network(&self) -> &Network {
        match self {
            Optimizer::Attractor(o) => o.network(),
            Optimizer::KMeans(o) => o.network(),
            Optimizer::Annealing(o) => o.network(),
        }
    }

    /// Run to completion. The network is left connected in its final state.
    pub fn run(&mut self) -> OptimizationReport {
        match self {
            Optimizer::Attractor(o) => o.run(),
            Optimizer::KMeans(o) => o.run(),
            Optimizer::Annealing(o) => o.run(),
        }
    }
}
