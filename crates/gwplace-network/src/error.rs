//! Error types for the network crate.

use gwplace_link::LinkError;
use thiserror::Error;

/// Errors building, loading or saving a network.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Link parameters failed validation.
    #[error("Invalid link parameters: {0}")]
    Link(#[from] LinkError),

    /// I/O error reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// GeoJSON could not be parsed or produced.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Histogram bin width must be positive.
    #[error("Histogram bin width must be positive (got {0} m)")]
    InvalidHistogramBin(f64),

    /// Only Point geometries describe network elements.
    #[error("Feature {feature}: unsupported geometry type {geometry:?}")]
    UnsupportedGeometry {
        /// Index of the feature in the collection.
        feature: usize,
        /// Geometry type found.
        geometry: String,
    },

    /// Point coordinates missing, non-numeric or out of range.
    #[error("Feature {feature}: invalid coordinates: {reason}")]
    InvalidCoordinates {
        /// Index of the feature in the collection.
        feature: usize,
        /// What was wrong.
        reason: String,
    },

    /// `type` property is neither `gateway` nor `end_device`.
    #[error("Feature {feature}: unknown feature type {kind:?}")]
    UnknownFeatureType {
        /// Index of the feature in the collection.
        feature: usize,
        /// Type found (empty if absent).
        kind: String,
    },

    /// A required property is absent.
    #[error("Feature {feature}: missing property {field:?}")]
    MissingField {
        /// Index of the feature in the collection.
        feature: usize,
        /// Property name.
        field: &'static str,
    },

    /// A point lies outside the elevation grid.
    #[error("Feature {feature}: ({lat}, {lng}) is outside the elevation grid")]
    OutsideGrid {
        /// Index of the feature in the collection.
        feature: usize,
        /// Point latitude.
        lat: f64,
        /// Point longitude.
        lng: f64,
    },

    /// A property has the wrong type or an out-of-range value.
    #[error("Feature {feature}: invalid property {field:?}: {reason}")]
    InvalidField {
        /// Index of the feature in the collection.
        feature: usize,
        /// Property name.
        field: &'static str,
        /// What was wrong.
        reason: String,
    },
}
