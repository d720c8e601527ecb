//! # gwplace-common
//!
//! Common geographic types shared by every gwplace crate.
//!
//! - [`GeoPoint`] - a latitude/longitude/altitude triple with vector arithmetic
//! - [`BoundingBox`] - an axis-aligned lat/lng rectangle
//! - [`distance`] - the distance family (haversine, equirectangular, squared, ECEF)
//!
//! ## Example
//!
//! ```
//! use gwplace_common::{distance, GeoPoint};
//!
//! let a = GeoPoint::new(47.6062, -122.3321, 2.0);
//! let b = GeoPoint::new(45.5152, -122.6784, 2.0);
//!
//! let d = distance::haversine(&a, &b);
//! assert!((d - 233_000.0).abs() < 5_000.0);
//! ```

mod bbox;
pub mod distance;
mod point;

pub use bbox::BoundingBox;
pub use point::{centroid, GeoPoint};
