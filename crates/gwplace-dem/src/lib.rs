//! # gwplace-dem
//!
//! Digital Elevation Model (DEM) grid for gateway placement.
//!
//! This crate provides an [`ElevationGrid`] built from an unordered cloud of
//! `(lat, lng, altitude)` samples, typically read from a CSV export of SRTM or
//! NASA topography data. The samples are regularized onto a rectangular grid
//! whose axes are the sorted, de-duplicated latitudes and longitudes of the
//! input. Missing cells are kept as "no data" and resolved by nearest-neighbour
//! fallback during interpolation.
//!
//! ## Queries
//!
//! - [`ElevationGrid::bilinear_interpolation`] - terrain altitude at any in-grid point
//! - [`ElevationGrid::terrain_profile`] - altitude and distance samples along a path
//! - [`ElevationGrid::line_of_sight`] - terrain-clear path test with optional
//!   Fresnel-zone clearance
//! - [`ElevationGrid::min_altitude`] / [`ElevationGrid::max_altitude`]
//!
//! The distance family lives in [`gwplace_common::distance`] and is re-exported
//! here as [`distance`].
//!
//! ## Example
//!
//! ```
//! use gwplace_common::GeoPoint;
//! use gwplace_dem::{ElevationGrid, LosOptions};
//!
//! let grid = ElevationGrid::from_points(&[
//!     (0.0, 0.0, 10.0),
//!     (0.0, 1.0, 20.0),
//!     (1.0, 0.0, 30.0),
//!     (1.0, 1.0, 40.0),
//! ])?;
//!
//! assert_eq!(grid.bilinear_interpolation(0.5, 0.5)?, 25.0);
//!
//! let a = GeoPoint::new(0.1, 0.1, 50.0);
//! let b = GeoPoint::new(0.9, 0.9, 50.0);
//! assert!(grid.line_of_sight(&a, &b, &LosOptions::default())?);
//! # Ok::<(), gwplace_dem::DemError>(())
//! ```

mod error;
mod grid;
mod loader;
mod los;

pub use error::DemError;
pub use gwplace_common::distance;
pub use grid::ElevationGrid;
pub use los::{FresnelClearance, LosOptions, TerrainProfile, DEFAULT_LOS_SAMPLES};

/// Result type for DEM operations.
pub type Result<T> = std::result::Result<T, DemError>;
