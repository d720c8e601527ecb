//! Run configuration file.
//!
//! A single YAML document; every field is optional.
//!
//! ```yaml
//! link:
//!   max_range_m: 3000
//!   fresnel: true
//!   band: eu868
//! histogram_bin_m: 500
//! optimizer:
//!   kind: kmeans
//!   strategy: fixed_k
//!   seed: 7
//! ```

use crate::{Result, RunnerError};
use gwplace_link::LinkParams;
use gwplace_network::DEFAULT_BIN_WIDTH_M;
use gwplace_optimize::OptimizerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Everything a `solve` run needs besides its input files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Link eligibility parameters.
    pub link: LinkParams,
    /// Bin width of the link-distance histogram (meters).
    pub histogram_bin_m: f64,
    /// Optimizer and its parameters.
    pub optimizer: OptimizerConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            link: LinkParams::default(),
            histogram_bin_m: DEFAULT_BIN_WIDTH_M,
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl RunConfig {
    /// Load a configuration file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config = Self::from_yaml_str(&std::fs::read_to_string(path)?)?;
        info!(
            path = %path.display(),
            optimizer = config.optimizer.name(),
            "Loaded run configuration"
        );
        Ok(config)
    }

    /// Parse a configuration from YAML. An empty document yields the defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Switch to the optimizer named on the command line.
    ///
    /// Naming the kind already configured keeps its fields (`clustering`
    /// additionally selects the fixed-k sweep); naming another kind replaces
    /// the optimizer with that kind's defaults. The configured seed is kept
    /// either way.
    pub fn select_optimizer(&mut self, name: &str) -> Result<()> {
        let selected = OptimizerConfig::from_name(name)
            .ok_or_else(|| RunnerError::UnknownOptimizer(name.to_string()))?;
        match (&mut self.optimizer, selected) {
            (OptimizerConfig::KMeans(current), OptimizerConfig::KMeans(chosen)) => {
                if name.eq_ignore_ascii_case("clustering") {
                    current.strategy = chosen.strategy;
                }
            }
            (current, chosen) if current.name() == chosen.name() => {}
            (current, mut chosen) => {
                chosen.set_seed(current.seed());
                *current = chosen;
            }
        }
        Ok(())
    }
}
