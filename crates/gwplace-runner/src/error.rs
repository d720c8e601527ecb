//! Error type for the runner.

use gwplace_dem::DemError;
use gwplace_link::LinkError;
use gwplace_network::NetworkError;
use gwplace_optimize::OptimizeError;
use thiserror::Error;

/// Errors surfaced by the `gwplace` commands.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Elevation error: {0}")]
    Dem(#[from] DemError),

    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Optimizer error: {0}")]
    Optimize(#[from] OptimizeError),

    #[error("Unknown optimizer '{0}' (expected attractor, kmeans, clustering or annealing)")]
    UnknownOptimizer(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
