//! Error types for the optimizer crate.

use thiserror::Error;

/// Reasons an optimizer refuses to start.
///
/// Running out of budget is not an error; it is reported through
/// [`OptimizationReport::converged`](crate::OptimizationReport::converged).
#[derive(Debug, Error, PartialEq)]
pub enum OptimizeError {
    #[error("Network has no end devices to cover")]
    NoEndDevices,

    #[error("Invalid optimizer configuration: {0}")]
    InvalidConfig(String),
}
