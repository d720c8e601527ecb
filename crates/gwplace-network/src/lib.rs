//! # gwplace-network
//!
//! Network model and connectivity engine for gateway placement.
//!
//! A [`Network`] owns a set of [`Gateway`]s and [`EndDevice`]s placed over a
//! shared [`ElevationGrid`](gwplace_dem::ElevationGrid). [`Network::connect`]
//! assigns every end device to the nearest gateway it can reach under the
//! network's [`LinkParams`](gwplace_link::LinkParams) and recomputes the
//! aggregate statistics the optimizers use as their fitness.
//!
//! ## Features
//!
//! - **Connectivity**: parallel nearest-reachable-gateway search (rayon)
//! - **Statistics**: connected count, total link distance, [`DistanceHistogram`]
//! - **GeoJSON**: load networks from and export solved networks to feature collections
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use gwplace_common::GeoPoint;
//! use gwplace_dem::ElevationGrid;
//! use gwplace_link::LinkParams;
//! use gwplace_network::Network;
//!
//! let grid = ElevationGrid::from_points(&[
//!     (0.0, 0.0, 0.0),
//!     (0.0, 0.1, 0.0),
//!     (0.1, 0.0, 0.0),
//!     (0.1, 0.1, 0.0),
//! ])?;
//! let mut net = Network::new(Arc::new(grid), LinkParams::default())?;
//! net.add_gateway(GeoPoint::new(0.05, 0.05, 10.0));
//! net.add_end_device("sensor-1", GeoPoint::new(0.05, 0.06, 1.0));
//!
//! assert_eq!(net.connect(), 1);
//! assert_eq!(net.end_devices()[0].assigned_gateway(), Some(0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod elements;
mod error;
mod geojson;
mod histogram;
mod network;

pub use elements::{EndDevice, Gateway};
pub use error::NetworkError;
pub use geojson::{Feature, FeatureCollection, Geometry};
pub use histogram::{DistanceHistogram, DEFAULT_BIN_WIDTH_M, MIN_BIN_WIDTH_M};
pub use network::Network;

/// Result type for network operations.
pub type Result<T> = std::result::Result<T, NetworkError>;
