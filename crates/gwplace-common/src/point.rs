//! Geographic point type.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Sub};

/// A geographic position.
///
/// `alt` is the antenna height above ground for network elements, in meters.
///
/// Vector arithmetic only touches `lat` and `lng`. The altitude of the left
/// operand is carried through unchanged, so `a - b` keeps `a.alt` and
/// `p + delta` keeps `p.alt`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
    /// Altitude in meters.
    pub alt: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub const fn new(lat: f64, lng: f64, alt: f64) -> Self {
        Self { lat, lng, alt }
    }

    /// Same position with a different altitude.
    pub const fn with_alt(self, alt: f64) -> Self {
        Self { alt, ..self }
    }

    /// Euclidean norm of the lat/lng components, in degrees.
    ///
    /// Used as the "speed" of a displacement vector by the optimizers.
    pub fn norm(&self) -> f64 {
        (self.lat * self.lat + self.lng * self.lng).sqrt()
    }

    /// Squared lat/lng norm.
    pub fn norm_squared(&self) -> f64 {
        self.lat * self.lat + self.lng * self.lng
    }

    /// Whether the point is a valid WGS-84 coordinate.
    pub fn is_valid_coordinate(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl Add for GeoPoint {
    type Output = GeoPoint;

    fn add(self, rhs: GeoPoint) -> GeoPoint {
        GeoPoint::new(self.lat + rhs.lat, self.lng + rhs.lng, self.alt)
    }
}

impl AddAssign for GeoPoint {
    fn add_assign(&mut self, rhs: GeoPoint) {
        self.lat += rhs.lat;
        self.lng += rhs.lng;
    }
}

impl Sub for GeoPoint {
    type Output = GeoPoint;

    fn sub(self, rhs: GeoPoint) -> GeoPoint {
        GeoPoint::new(self.lat - rhs.lat, self.lng - rhs.lng, self.alt)
    }
}

impl Mul<f64> for GeoPoint {
    type Output = GeoPoint;

    fn mul(self, k: f64) -> GeoPoint {
        GeoPoint::new(self.lat * k, self.lng * k, self.alt)
    }
}

/// Mean lat/lng of a set of points.
///
/// The altitude of the result is the mean altitude. Returns `None` for an
/// empty input.
pub fn centroid<'a, I>(points: I) -> Option<GeoPoint>
where
    I: IntoIterator<Item = &'a GeoPoint>,
{
    let mut sum = GeoPoint::default();
    let mut count = 0usize;
    for p in points {
        sum.lat += p.lat;
        sum.lng += p.lng;
        sum.alt += p.alt;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    let n = count as f64;
    Some(GeoPoint::new(sum.lat / n, sum.lng / n, sum.alt / n))
}
