//! Distance functions between geographic points.
//!
//! All inputs are in degrees, all outputs in meters. None of these functions
//! touch terrain data.
//!
//! | Function | Uses altitude | Cost | Use |
//! |----------|---------------|------|-----|
//! | [`haversine`] | no | trig-heavy | terrain profile distances |
//! | [`equirectangular`] | no | cheap | ranking gateways, link distance |
//! | [`squared_distance`] | no | cheapest | comparisons in hot loops |
//! | [`straight_line`] | yes | ECEF conversion | 3-D slant range |

use crate::GeoPoint;

/// Mean Earth radius used by the spherical approximations, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// WGS-84 semi-major axis, in meters.
pub const WGS84_SEMI_MAJOR_AXIS_M: f64 = 6_378_137.0;

/// WGS-84 first eccentricity squared.
pub const WGS84_ECCENTRICITY_SQ: f64 = 6.694_379_990_14e-3;

/// Great-circle distance on a sphere.
pub fn haversine(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

/// Flat-earth small-angle distance.
///
/// Accurate to well under a percent over the few-kilometre spans of a LoRa
/// link and much cheaper than [`haversine`].
pub fn equirectangular(a: &GeoPoint, b: &GeoPoint) -> f64 {
    squared_distance(a, b).sqrt()
}

/// Square of [`equirectangular`], for comparisons that can skip the root.
pub fn squared_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let mean_lat = ((a.lat + b.lat) / 2.0).to_radians();
    let x = (b.lng - a.lng).to_radians() * mean_lat.cos();
    let y = (b.lat - a.lat).to_radians();
    EARTH_RADIUS_M * EARTH_RADIUS_M * (x * x + y * y)
}

/// Earth-Centered Earth-Fixed coordinates of a point on the WGS-84 ellipsoid.
///
/// Returns `[x, y, z]` in meters; `alt` is the height above the ellipsoid.
pub fn to_ecef(p: &GeoPoint) -> [f64; 3] {
    let phi = p.lat.to_radians();
    let lambda = p.lng.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_lambda, cos_lambda) = lambda.sin_cos();

    let n = WGS84_SEMI_MAJOR_AXIS_M / (1.0 - WGS84_ECCENTRICITY_SQ * sin_phi * sin_phi).sqrt();

    [
        (n + p.alt) * cos_phi * cos_lambda,
        (n + p.alt) * cos_phi * sin_lambda,
        (n * (1.0 - WGS84_ECCENTRICITY_SQ) + p.alt) * sin_phi,
    ]
}

/// 3-D straight-line distance through ECEF space.
///
/// Accounts for both altitude and Earth curvature.
pub fn straight_line(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let p1 = to_ecef(a);
    let p2 = to_ecef(b);
    let dx = p2[0] - p1[0];
    let dy = p2[1] - p1[1];
    let dz = p2[2] - p1[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}
