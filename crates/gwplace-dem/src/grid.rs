//! Rectangular elevation grid.

use crate::{DemError, Result};
use gwplace_common::{BoundingBox, GeoPoint};
use tracing::debug;

/// Terrain altitudes sampled on a rectangular, axis-aligned lat/lng grid.
///
/// The grid is immutable once built and is `Sync`, so any number of worker
/// threads can query it concurrently.
#[derive(Debug, Clone)]
pub struct ElevationGrid {
    /// Sorted, de-duplicated latitudes (south to north).
    latitudes: Vec<f64>,
    /// Sorted, de-duplicated longitudes (west to east).
    longitudes: Vec<f64>,
    /// Altitudes in row-major order, `[lat_idx * n_lng + lng_idx]`.
    /// Cells with no sample hold `NaN`.
    altitudes: Vec<f64>,
    min_altitude: f64,
    max_altitude: f64,
}

impl ElevationGrid {
    /// Build a grid from parallel latitude, longitude and altitude vectors.
    ///
    /// The samples may come in any order and need not cover every cell. When
    /// two samples share a coordinate the later one wins.
    pub fn new(lats: &[f64], lngs: &[f64], alts: &[f64]) -> Result<Self> {
        if lats.len() != lngs.len() || lats.len() != alts.len() {
            return Err(DemError::LengthMismatch {
                lats: lats.len(),
                lngs: lngs.len(),
                alts: alts.len(),
            });
        }
        if lats.is_empty() {
            return Err(DemError::EmptyDataset);
        }
        if let Some((&lat, &lng)) = lats
            .iter()
            .zip(lngs)
            .find(|(lat, lng)| !lat.is_finite() || !lng.is_finite())
        {
            return Err(DemError::NonFiniteCoordinate { lat, lng });
        }

        let latitudes = unique_sorted(lats);
        let longitudes = unique_sorted(lngs);
        if latitudes.len() < 2 || longitudes.len() < 2 {
            return Err(DemError::DegenerateGrid {
                lats: latitudes.len(),
                lngs: longitudes.len(),
            });
        }

        let n_lng = longitudes.len();
        let mut altitudes = vec![f64::NAN; latitudes.len() * n_lng];
        for ((lat, lng), &alt) in lats.iter().zip(lngs).zip(alts) {
            // Every sample coordinate is on the axes by construction.
            let i = axis_position(&latitudes, *lat);
            let j = axis_position(&longitudes, *lng);
            altitudes[i * n_lng + j] = alt;
        }

        let (min_altitude, max_altitude) = altitudes
            .iter()
            .filter(|a| !a.is_nan())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &a| {
                (lo.min(a), hi.max(a))
            });

        let filled = altitudes.iter().filter(|a| !a.is_nan()).count();
        debug!(
            lats = latitudes.len(),
            lngs = n_lng,
            filled,
            gaps = altitudes.len() - filled,
            "Built elevation grid"
        );

        Ok(Self {
            latitudes,
            longitudes,
            altitudes,
            min_altitude,
            max_altitude,
        })
    }

    /// Build a grid from `(lat, lng, altitude)` triples.
    pub fn from_points(points: &[(f64, f64, f64)]) -> Result<Self> {
        let lats: Vec<f64> = points.iter().map(|p| p.0).collect();
        let lngs: Vec<f64> = points.iter().map(|p| p.1).collect();
        let alts: Vec<f64> = points.iter().map(|p| p.2).collect();
        Self::new(&lats, &lngs, &alts)
    }

    /// Whether a coordinate lies within the grid (edges inclusive).
    pub fn in_grid(&self, lat: f64, lng: f64) -> bool {
        self.bounds().contains(lat, lng)
    }

    /// Whether a point lies within the grid.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.in_grid(point.lat, point.lng)
    }

    /// Terrain altitude at a coordinate, bilinearly interpolated.
    ///
    /// The enclosing cell is found by binary search on each axis. If any of
    /// the four corners has no data, the nearest corner that does is used
    /// instead. Points outside the grid are an error; callers that can skip
    /// a point should check [`in_grid`](Self::in_grid) first.
    pub fn bilinear_interpolation(&self, lat: f64, lng: f64) -> Result<f64> {
        if !self.in_grid(lat, lng) {
            let b = self.bounds();
            return Err(DemError::OutOfBounds {
                lat,
                lng,
                min_lat: b.min_lat,
                max_lat: b.max_lat,
                min_lng: b.min_lng,
                max_lng: b.max_lng,
            });
        }

        let i = cell_index(&self.latitudes, lat);
        let j = cell_index(&self.longitudes, lng);

        let (y1, y2) = (self.latitudes[i], self.latitudes[i + 1]);
        let (x1, x2) = (self.longitudes[j], self.longitudes[j + 1]);

        let q11 = self.cell(i, j);
        let q21 = self.cell(i, j + 1);
        let q12 = self.cell(i + 1, j);
        let q22 = self.cell(i + 1, j + 1);

        if q11.is_nan() || q21.is_nan() || q12.is_nan() || q22.is_nan() {
            return self.nearest_corner(lat, lng, i, j);
        }
        // Flat cell: skip the weighting so rounding cannot lift level terrain.
        if q11 == q21 && q11 == q12 && q11 == q22 {
            return Ok(q11);
        }

        let tx = (lng - x1) / (x2 - x1);
        let ty = (lat - y1) / (y2 - y1);

        let south = q11 * (1.0 - tx) + q21 * tx;
        let north = q12 * (1.0 - tx) + q22 * tx;
        Ok(south * (1.0 - ty) + north * ty)
    }

    /// Terrain altitude under a point (its own `alt` is ignored).
    pub fn altitude_at(&self, point: &GeoPoint) -> Result<f64> {
        self.bilinear_interpolation(point.lat, point.lng)
    }

    /// Lowest sampled altitude in the grid.
    pub fn min_altitude(&self) -> f64 {
        self.min_altitude
    }

    /// Highest sampled altitude in the grid.
    pub fn max_altitude(&self) -> f64 {
        self.max_altitude
    }

    /// Geographic bounds of the grid.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox {
            min_lat: self.latitudes[0],
            min_lng: self.longitudes[0],
            max_lat: self.latitudes[self.latitudes.len() - 1],
            max_lng: self.longitudes[self.longitudes.len() - 1],
        }
    }

    /// Number of distinct latitudes.
    pub fn num_latitudes(&self) -> usize {
        self.latitudes.len()
    }

    /// Number of distinct longitudes.
    pub fn num_longitudes(&self) -> usize {
        self.longitudes.len()
    }

    fn cell(&self, i: usize, j: usize) -> f64 {
        self.altitudes[i * self.longitudes.len() + j]
    }

    /// Nearest of the four corners of cell `(i, j)` that holds data.
    fn nearest_corner(&self, lat: f64, lng: f64, i: usize, j: usize) -> Result<f64> {
        let corners = [(i, j), (i, j + 1), (i + 1, j), (i + 1, j + 1)];
        corners
            .iter()
            .map(|&(ci, cj)| {
                let d_lat = lat - self.latitudes[ci];
                let d_lng = lng - self.longitudes[cj];
                (d_lat * d_lat + d_lng * d_lng, self.cell(ci, cj))
            })
            .filter(|(_, alt)| !alt.is_nan())
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, alt)| alt)
            .ok_or(DemError::NoData { lat, lng })
    }
}

fn unique_sorted(values: &[f64]) -> Vec<f64> {
    let mut axis = values.to_vec();
    axis.sort_by(f64::total_cmp);
    axis.dedup();
    axis
}

/// Exact index of `value` on a sorted axis that is known to contain it.
fn axis_position(axis: &[f64], value: f64) -> usize {
    axis.partition_point(|&a| a < value)
}

/// Index `i` of the cell such that `axis[i] <= value <= axis[i + 1]`.
///
/// Clamped so that `i + 1` is always a valid index.
fn cell_index(axis: &[f64], value: f64) -> usize {
    let upper = axis.partition_point(|&a| a < value);
    upper.saturating_sub(1).min(axis.len() - 2)
}
