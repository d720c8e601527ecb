//! Link parameters and the single-link eligibility test.

use crate::Band;
use gwplace_common::{distance, GeoPoint};
use gwplace_dem::{ElevationGrid, LosOptions, DEFAULT_LOS_SAMPLES};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Invalid link configuration.
#[derive(Debug, Error, PartialEq)]
pub enum LinkError {
    #[error("Maximum range must be positive and finite (got {0} m)")]
    InvalidRange(f64),

    #[error("Line of sight needs at least 2 samples (got {0})")]
    TooFewSamples(usize),

    #[error("Fresnel factor must be positive (got {0})")]
    InvalidFresnelFactor(f64),

    #[error("Wavelength must be positive (got {0} m)")]
    InvalidWavelength(f64),
}

// ============================================================================
// Link Parameters
// ============================================================================

/// Configurable parameters for gateway to end-device links.
///
/// # Example
///
/// ```
/// use gwplace_link::{Band, LinkParams};
///
/// let params: LinkParams = serde_yaml::from_str("max_range_m: 5000\nband: eu868\n").unwrap();
/// assert_eq!(params.max_range_m, 5000.0);
/// assert_eq!(params.los_samples, 100);
/// assert_eq!(params.band, Band::Eu868);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkParams {
    /// Maximum link distance (meters).
    pub max_range_m: f64,
    /// Segments along the sight line checked against terrain.
    pub los_samples: usize,
    /// Require Fresnel-zone clearance in addition to geometric line of sight.
    pub fresnel: bool,
    /// Fraction of the first Fresnel zone that must be clear.
    pub fresnel_factor: f64,
    /// Band plan providing the carrier wavelength.
    pub band: Band,
    /// Explicit wavelength (meters), overriding `band`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wavelength_m: Option<f64>,
}

impl Default for LinkParams {
    fn default() -> Self {
        Self {
            max_range_m: 2000.0,
            los_samples: DEFAULT_LOS_SAMPLES,
            fresnel: false,
            fresnel_factor: 0.6,
            band: Band::Us915,
            wavelength_m: None,
        }
    }
}

impl LinkParams {
    /// Default parameters with a different maximum range.
    pub fn with_max_range(max_range_m: f64) -> Self {
        Self {
            max_range_m,
            ..Self::default()
        }
    }

    /// Carrier wavelength used for Fresnel clearance.
    pub fn wavelength(&self) -> f64 {
        self.wavelength_m.unwrap_or_else(|| self.band.wavelength_m())
    }

    /// Check that the parameters describe a usable link model.
    pub fn validate(&self) -> crate::Result<()> {
        if !(self.max_range_m.is_finite() && self.max_range_m > 0.0) {
            return Err(LinkError::InvalidRange(self.max_range_m));
        }
        if self.los_samples < 2 {
            return Err(LinkError::TooFewSamples(self.los_samples));
        }
        if self.fresnel {
            if !(self.fresnel_factor > 0.0) {
                return Err(LinkError::InvalidFresnelFactor(self.fresnel_factor));
            }
            let wavelength = self.wavelength();
            if !(wavelength > 0.0) {
                return Err(LinkError::InvalidWavelength(wavelength));
            }
        }
        Ok(())
    }

    /// Line-of-sight options matching these parameters.
    pub fn los_options(&self) -> LosOptions {
        let opts = LosOptions::with_samples(self.los_samples);
        if self.fresnel {
            opts.fresnel(self.fresnel_factor, self.wavelength())
        } else {
            opts
        }
    }

    /// Distance of the link from `gateway` to `device` if it is usable.
    ///
    /// Range is checked first on squared distance so the terrain walk only
    /// runs for candidates that can possibly connect. Endpoints outside the
    /// grid make the link unusable.
    pub fn evaluate(
        &self,
        grid: &ElevationGrid,
        gateway: &GeoPoint,
        device: &GeoPoint,
    ) -> Option<f64> {
        let sq = distance::squared_distance(gateway, device);
        if sq > self.max_range_m * self.max_range_m {
            return None;
        }
        match grid.line_of_sight(gateway, device, &self.los_options()) {
            Ok(true) => Some(sq.sqrt()),
            Ok(false) | Err(_) => None,
        }
    }
}
