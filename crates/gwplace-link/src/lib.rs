//! # gwplace-link
//!
//! Radio link model for gateway placement.
//!
//! A gateway can serve an end device when the two are within the configured
//! maximum range and the terrain between them leaves a clear line of sight,
//! optionally with a fraction of the first Fresnel zone kept clear.
//!
//! ## Features
//!
//! - **Link Parameters**: [`LinkParams`] with serde defaults, loadable from YAML
//! - **Frequency Bands**: [`Band`] supplies the carrier wavelength for Fresnel clearance
//! - **Eligibility**: [`LinkParams::evaluate`] is the single-link test used by
//!   the connectivity engine

mod band;
mod params;

pub use band::{Band, SPEED_OF_LIGHT_M_S};
pub use params::{LinkError, LinkParams};

/// Result type for link operations.
pub type Result<T> = std::result::Result<T, LinkError>;
