//! Axis-aligned geographic bounding box.

use crate::GeoPoint;
use serde::{Deserialize, Serialize};

/// Geographic bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum latitude (south edge).
    pub min_lat: f64,
    /// Minimum longitude (west edge).
    pub min_lng: f64,
    /// Maximum latitude (north edge).
    pub max_lat: f64,
    /// Maximum longitude (east edge).
    pub max_lng: f64,
}

impl BoundingBox {
    /// Smallest box containing every point, or `None` if there are none.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a GeoPoint>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = BoundingBox {
            min_lat: first.lat,
            min_lng: first.lng,
            max_lat: first.lat,
            max_lng: first.lng,
        };
        for p in iter {
            bbox.min_lat = bbox.min_lat.min(p.lat);
            bbox.min_lng = bbox.min_lng.min(p.lng);
            bbox.max_lat = bbox.max_lat.max(p.lat);
            bbox.max_lng = bbox.max_lng.max(p.lng);
        }
        Some(bbox)
    }

    /// Check if a coordinate is within the bounds (edges inclusive).
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
    }

    /// Center of the box at zero altitude.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
            0.0,
        )
    }

    /// GeoJSON-ordered `[min_lng, min_lat, max_lng, max_lat]`.
    pub fn to_geojson(&self) -> [f64; 4] {
        [self.min_lng, self.min_lat, self.max_lng, self.max_lat]
    }
}
