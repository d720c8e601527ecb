//! Error types for the DEM crate.

use thiserror::Error;

/// Errors that can occur when building or querying an elevation grid.
#[derive(Debug, Error)]
pub enum DemError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A CSV row could not be interpreted as `lat,lng,alt`.
    #[error("Invalid elevation record on line {line}: {reason}")]
    InvalidRecord {
        /// 1-based line number in the source.
        line: u64,
        /// What was wrong with the record.
        reason: String,
    },

    /// The input contained no samples.
    #[error("Empty elevation dataset")]
    EmptyDataset,

    /// Parallel latitude/longitude/altitude inputs have different lengths.
    #[error("Latitude, longitude and altitude inputs differ in length ({lats}, {lngs}, {alts})")]
    LengthMismatch {
        /// Number of latitudes.
        lats: usize,
        /// Number of longitudes.
        lngs: usize,
        /// Number of altitudes.
        alts: usize,
    },

    /// The samples do not span at least two distinct latitudes and longitudes.
    #[error("Grid must be at least 2x2 for bilinear interpolation (got {lats}x{lngs})")]
    DegenerateGrid {
        /// Distinct latitudes found.
        lats: usize,
        /// Distinct longitudes found.
        lngs: usize,
    },

    /// A sample coordinate was NaN or infinite.
    #[error("Non-finite coordinate ({lat}, {lng})")]
    NonFiniteCoordinate {
        /// Sample latitude.
        lat: f64,
        /// Sample longitude.
        lng: f64,
    },

    /// Coordinate is outside the bounds of the grid.
    #[error("Coordinate ({lat}, {lng}) is outside grid bounds ({min_lat}-{max_lat}, {min_lng}-{max_lng})")]
    OutOfBounds {
        /// Requested latitude.
        lat: f64,
        /// Requested longitude.
        lng: f64,
        /// Grid minimum latitude.
        min_lat: f64,
        /// Grid maximum latitude.
        max_lat: f64,
        /// Grid minimum longitude.
        min_lng: f64,
        /// Grid maximum longitude.
        max_lng: f64,
    },

    /// No data in any corner of the enclosing cell.
    #[error("No elevation data at coordinate ({lat}, {lng})")]
    NoData {
        /// Requested latitude.
        lat: f64,
        /// Requested longitude.
        lng: f64,
    },

    /// Terrain profile requested with fewer than two steps.
    #[error("Terrain profile needs at least 2 steps (got {0})")]
    InvalidSteps(usize),
}
