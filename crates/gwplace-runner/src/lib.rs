//! # gwplace-runner
//!
//! Command-line front end for gateway placement.
//!
//! - `gwplace solve` loads an elevation CSV and a GeoJSON network, runs an
//!   optimizer and optionally writes the solved network back out as GeoJSON.
//! - `gwplace los` reports distance, line of sight and the terrain profile
//!   between two points.
//!
//! The library half holds everything the binary does so it can be driven
//! from tests.

mod config;
mod error;
mod los;
mod solve;

pub use config::RunConfig;
pub use error::RunnerError;
pub use los::{format_los_text, point_from_args, run_los, LosReport};
pub use solve::{format_solve_json, format_solve_text, run_solve, SolveOptions, SolveOutcome};

/// Result type for runner operations.
pub type Result<T> = std::result::Result<T, RunnerError>;

/// Report format on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
