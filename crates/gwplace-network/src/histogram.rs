//! Link distance histogram.

use crate::{NetworkError, Result};
use serde::Serialize;

/// Default histogram bin width in meters.
pub const DEFAULT_BIN_WIDTH_M: f64 = 250.0;

/// Smallest accepted bin width in meters.
pub const MIN_BIN_WIDTH_M: f64 = 1.0;

/// Fixed-width histogram of assigned link distances.
///
/// `counts[i]` is the number of links with distance in `[i * w, (i + 1) * w)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceHistogram {
    /// Bin width (meters).
    bin_width_m: f64,
    /// Links per bin.
    counts: Vec<usize>,
}

impl Default for DistanceHistogram {
    fn default() -> Self {
        Self {
            bin_width_m: DEFAULT_BIN_WIDTH_M,
            counts: Vec::new(),
        }
    }
}

impl DistanceHistogram {
    /// Empty histogram with the given bin width.
    ///
    /// The width must be finite and at least [`MIN_BIN_WIDTH_M`].
    pub fn new(bin_width_m: f64) -> Result<Self> {
        if !(bin_width_m.is_finite() && bin_width_m >= MIN_BIN_WIDTH_M) {
            return Err(NetworkError::InvalidHistogramBin(bin_width_m));
        }
        Ok(Self {
            bin_width_m,
            counts: Vec::new(),
        })
    }

    pub fn bin_width_m(&self) -> f64 {
        self.bin_width_m
    }

    /// Links per bin; trailing empty bins are not stored.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Count one link of `distance_m` meters.
    pub fn record(&mut self, distance_m: f64) {
        let bin = (distance_m.max(0.0) / self.bin_width_m) as usize;
        if bin >= self.counts.len() {
            self.counts.resize(bin + 1, 0);
        }
        self.counts[bin] += 1;
    }

    /// Drop all counts, keeping the bin width.
    pub fn clear(&mut self) {
        self.counts.clear();
    }

    /// Total number of recorded links.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// `[start, end)` range of bin `i` in meters.
    pub fn bin_range(&self, i: usize) -> (f64, f64) {
        (i as f64 * self.bin_width_m, (i + 1) as f64 * self.bin_width_m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record() {
        let mut h = DistanceHistogram::default();
        h.record(0.0);
        h.record(249.9);
        h.record(250.0);
        h.record(1100.0);
        assert_eq!(h.counts, vec![2, 1, 0, 0, 1]);
        assert_eq!(h.total(), 4);
        assert_eq!(h.bin_range(4), (1000.0, 1250.0));
    }

    #[test]
    fn test_clear_keeps_width() {
        let mut h = DistanceHistogram::new(100.0).unwrap();
        h.record(50.0);
        h.clear();
        assert!(h.counts().is_empty());
        assert_eq!(h.bin_width_m(), 100.0);
    }

    #[test]
    fn test_rejects_unusable_width() {
        for width in [0.0, -250.0, 1e-6, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                DistanceHistogram::new(width),
                Err(NetworkError::InvalidHistogramBin(_))
            ));
        }
        assert!(DistanceHistogram::new(MIN_BIN_WIDTH_M).is_ok());
    }
}
