//! Terrain profiles and line-of-sight tests.

use crate::{DemError, ElevationGrid, Result};
use gwplace_common::{distance, GeoPoint};

/// Default number of samples along a line-of-sight path.
pub const DEFAULT_LOS_SAMPLES: usize = 100;

/// Fresnel-zone clearance required around the sight line.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FresnelClearance {
    /// Fraction of the first Fresnel zone radius that must be clear (0.6 is customary).
    pub factor: f64,
    /// Carrier wavelength in meters.
    pub wavelength_m: f64,
}

impl FresnelClearance {
    /// Required clearance at a point `d1` meters from one end and `d2` from the other.
    pub fn clearance(&self, d1: f64, d2: f64) -> f64 {
        let total = d1 + d2;
        if total <= 0.0 {
            return 0.0;
        }
        self.factor * (self.wavelength_m * d1 * d2 / total).sqrt()
    }
}

/// Options for [`ElevationGrid::line_of_sight`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LosOptions {
    /// Number of segments the path is divided into. Only the `samples - 1`
    /// interior points are checked. Values below 2 are treated as 2.
    pub samples: usize,
    /// Optional Fresnel-zone clearance.
    pub fresnel: Option<FresnelClearance>,
}

impl Default for LosOptions {
    fn default() -> Self {
        Self {
            samples: DEFAULT_LOS_SAMPLES,
            fresnel: None,
        }
    }
}

impl LosOptions {
    /// Plain geometric line of sight with `samples` segments.
    pub fn with_samples(samples: usize) -> Self {
        Self {
            samples,
            fresnel: None,
        }
    }

    /// Same options with Fresnel clearance enabled.
    pub fn fresnel(mut self, factor: f64, wavelength_m: f64) -> Self {
        self.fresnel = Some(FresnelClearance {
            factor,
            wavelength_m,
        });
        self
    }
}

/// Terrain altitude samples along a path.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerrainProfile {
    /// Terrain altitude at each sample (meters).
    pub elevations: Vec<f64>,
    /// Haversine distance of each sample from the start (meters).
    pub distances: Vec<f64>,
}

impl TerrainProfile {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.elevations.len()
    }

    /// Whether the profile has no samples.
    pub fn is_empty(&self) -> bool {
        self.elevations.is_empty()
    }

    /// Highest terrain point along the path.
    pub fn max_elevation(&self) -> f64 {
        self.elevations.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

impl ElevationGrid {
    /// Sample terrain along the straight lat/lng path from `from` to `to`.
    ///
    /// Returns `steps + 1` samples including both endpoints.
    pub fn terrain_profile(
        &self,
        from: &GeoPoint,
        to: &GeoPoint,
        steps: usize,
    ) -> Result<TerrainProfile> {
        if steps < 2 {
            return Err(DemError::InvalidSteps(steps));
        }

        let mut elevations = Vec::with_capacity(steps + 1);
        let mut distances = Vec::with_capacity(steps + 1);
        for k in 0..=steps {
            let p = lerp(from, to, k as f64 / steps as f64);
            elevations.push(self.bilinear_interpolation(p.lat, p.lng)?);
            distances.push(distance::haversine(from, &p));
        }

        Ok(TerrainProfile {
            elevations,
            distances,
        })
    }

    /// Whether the terrain leaves a clear path between two antennas.
    ///
    /// Each point's `alt` is its antenna height above the local terrain. The
    /// sight line runs between the two antenna tips; terrain is sampled at the
    /// interior points `k / samples` for `k = 1..samples`. The endpoints
    /// themselves are never checked. The path is blocked when terrain rises
    /// above the sight line minus the Fresnel clearance (if enabled).
    ///
    /// Fails if either endpoint is outside the grid.
    pub fn line_of_sight(&self, from: &GeoPoint, to: &GeoPoint, opts: &LosOptions) -> Result<bool> {
        let samples = opts.samples.max(2);

        let e1 = self.altitude_at(from)? + from.alt;
        let e2 = self.altitude_at(to)? + to.alt;

        let total = match opts.fresnel {
            Some(_) => distance::equirectangular(from, to),
            None => 0.0,
        };

        for k in 1..samples {
            let t = k as f64 / samples as f64;
            let p = lerp(from, to, t);

            let terrain = self.bilinear_interpolation(p.lat, p.lng)?;
            let sight = e1 + t * (e2 - e1);
            let clearance = opts
                .fresnel
                .map_or(0.0, |f| f.clearance(total * t, total * (1.0 - t)));

            if terrain > sight - clearance {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

/// Linear interpolation of lat/lng; the result has zero altitude.
fn lerp(a: &GeoPoint, b: &GeoPoint, t: f64) -> GeoPoint {
    GeoPoint::new(a.lat + t * (b.lat - a.lat), a.lng + t * (b.lng - a.lng), 0.0)
}
