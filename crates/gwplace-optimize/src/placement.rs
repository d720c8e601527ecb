//! Random gateway placement shared by the optimizers.

use crate::{OptimizeError, Result};
use gwplace_common::{BoundingBox, GeoPoint};
use gwplace_metrics::metric_defs::{GATEWAYS_ADDED, OPTIMIZER_ITERATIONS};
use gwplace_metrics::OPTIMIZER_LABEL;
use gwplace_network::Network;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Half-width (degrees) of the jitter applied to inserted gateways.
pub const JITTER_DEG: f64 = 0.001;

/// Range of antenna heights for newly placed gateways.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AntennaHeight {
    /// Lowest antenna height above ground (meters).
    pub min_m: f64,
    /// Highest antenna height above ground (meters).
    pub max_m: f64,
}

impl Default for AntennaHeight {
    fn default() -> Self {
        Self {
            min_m: 2.0,
            max_m: 10.0,
        }
    }
}

impl AntennaHeight {
    /// Fixed height.
    pub fn fixed(height_m: f64) -> Self {
        Self {
            min_m: height_m,
            max_m: height_m,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min_m.is_finite() && self.max_m.is_finite())
            || self.min_m < 0.0
            || self.max_m < self.min_m
        {
            return Err(OptimizeError::InvalidConfig(format!(
                "antenna height range [{}, {}] m is invalid",
                self.min_m, self.max_m
            )));
        }
        Ok(())
    }

    /// Uniform height in `[min_m, max_m]`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max_m > self.min_m {
            rng.gen_range(self.min_m..=self.max_m)
        } else {
            self.min_m
        }
    }
}

/// Uniform position inside `bbox` with a random antenna height.
pub fn random_position<R: Rng + ?Sized>(
    rng: &mut R,
    bbox: &BoundingBox,
    antenna: &AntennaHeight,
) -> GeoPoint {
    let lat = rng.gen_range(bbox.min_lat..=bbox.max_lat);
    let lng = rng.gen_range(bbox.min_lng..=bbox.max_lng);
    GeoPoint::new(lat, lng, antenna.sample(rng))
}

/// `center` shifted by up to [`JITTER_DEG`] in lat and lng, with a random antenna height.
pub fn jittered<R: Rng + ?Sized>(rng: &mut R, center: &GeoPoint, antenna: &AntennaHeight) -> GeoPoint {
    let lat = center.lat + rng.gen_range(-JITTER_DEG..=JITTER_DEG);
    let lng = center.lng + rng.gen_range(-JITTER_DEG..=JITTER_DEG);
    GeoPoint::new(lat, lng, antenna.sample(rng))
}

/// End-device bounds, or [`OptimizeError::NoEndDevices`].
pub(crate) fn device_bounds(network: &Network) -> Result<BoundingBox> {
    network.end_device_bounds().ok_or(OptimizeError::NoEndDevices)
}

pub(crate) fn invalid(msg: impl Into<String>) -> OptimizeError {
    OptimizeError::InvalidConfig(msg.into())
}

pub(crate) fn record_iteration(optimizer: &'static str) {
    metrics::counter!(OPTIMIZER_ITERATIONS.name, OPTIMIZER_LABEL => optimizer).increment(1);
}

pub(crate) fn record_gateway_added(optimizer: &'static str) {
    metrics::counter!(GATEWAYS_ADDED.name, OPTIMIZER_LABEL => optimizer).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_antenna_validate() {
        assert!(AntennaHeight::default().validate().is_ok());
        assert!(AntennaHeight::fixed(0.0).validate().is_ok());
        assert!(AntennaHeight { min_m: 5.0, max_m: 1.0 }.validate().is_err());
        assert!(AntennaHeight { min_m: -1.0, max_m: 1.0 }.validate().is_err());
        assert!(AntennaHeight { min_m: 0.0, max_m: f64::NAN }.validate().is_err());
    }

    #[test]
    fn test_random_position_inside_bbox() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let bbox = BoundingBox {
            min_lat: 1.0,
            min_lng: 2.0,
            max_lat: 1.0,
            max_lng: 3.0,
        };
        let antenna = AntennaHeight::default();
        for _ in 0..100 {
            let p = random_position(&mut rng, &bbox, &antenna);
            assert_eq!(p.lat, 1.0);
            assert!(bbox.contains(p.lat, p.lng));
            assert!((2.0..=10.0).contains(&p.alt));
        }
    }

    #[test]
    fn test_jitter_is_small() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let center = GeoPoint::new(10.0, 20.0, 500.0);
        for _ in 0..100 {
            let p = jittered(&mut rng, &center, &AntennaHeight::fixed(4.0));
            assert!((p.lat - 10.0).abs() <= JITTER_DEG);
            assert!((p.lng - 20.0).abs() <= JITTER_DEG);
            assert_eq!(p.alt, 4.0);
        }
    }

    #[test]
    fn test_same_seed_same_positions() {
        let bbox = BoundingBox {
            min_lat: 0.0,
            min_lng: 0.0,
            max_lat: 1.0,
            max_lng: 1.0,
        };
        let antenna = AntennaHeight::default();
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..10 {
            assert_eq!(
                random_position(&mut a, &bbox, &antenna),
                random_position(&mut b, &bbox, &antenna)
            );
        }
    }
}
