//! The `los` command: inspect a single path over the terrain.

use crate::{Result, RunnerError};
use gwplace_common::{distance, GeoPoint};
use gwplace_dem::{ElevationGrid, LosOptions, TerrainProfile};
use gwplace_link::LinkParams;
use serde::Serialize;
use std::fmt::Write as _;

/// Build a point from `LAT LNG [HEIGHT]` command-line values.
pub fn point_from_args(values: &[f64]) -> Result<GeoPoint> {
    match *values {
        [lat, lng] => Ok(GeoPoint::new(lat, lng, 0.0)),
        [lat, lng, height] => Ok(GeoPoint::new(lat, lng, height)),
        _ => Err(RunnerError::InvalidArgument(format!(
            "expected LAT LNG [HEIGHT], got {} values",
            values.len()
        ))),
    }
}

/// Result of a path query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LosReport {
    pub from: GeoPoint,
    pub to: GeoPoint,
    /// Great-circle distance (meters).
    pub distance_m: f64,
    /// Equirectangular approximation, the metric used for link ranges.
    pub equirectangular_m: f64,
    /// Straight-line distance between the antenna tips (meters).
    pub straight_line_m: f64,
    /// Geometric line of sight.
    pub line_of_sight: bool,
    /// Line of sight with Fresnel clearance.
    pub fresnel_clear: bool,
    /// Required Fresnel clearance at mid-path (meters).
    pub midpoint_clearance_m: f64,
    pub profile: TerrainProfile,
}

/// Evaluate the path between two antennas.
///
/// Fresnel clearance uses `link.fresnel_factor` and `link.wavelength()`
/// whether or not `link.fresnel` is set. Both points must be valid
/// coordinates inside the grid with non-negative heights.
pub fn run_los(
    grid: &ElevationGrid,
    from: GeoPoint,
    to: GeoPoint,
    samples: usize,
    link: &LinkParams,
) -> Result<LosReport> {
    for (name, p) in [("from", &from), ("to", &to)] {
        if !p.is_valid_coordinate() {
            return Err(RunnerError::InvalidArgument(format!(
                "{} ({}, {}) is not a valid coordinate",
                name, p.lat, p.lng
            )));
        }
        if !(p.alt >= 0.0 && p.alt.is_finite()) {
            return Err(RunnerError::InvalidArgument(format!(
                "{} height must be non-negative (got {})",
                name, p.alt
            )));
        }
        if !grid.contains(p) {
            return Err(RunnerError::InvalidArgument(format!(
                "{} ({}, {}) is outside the elevation grid",
                name, p.lat, p.lng
            )));
        }
    }
    if samples < 2 {
        return Err(RunnerError::InvalidArgument(format!(
            "--samples must be at least 2 (got {})",
            samples
        )));
    }
    LinkParams {
        fresnel: true,
        ..link.clone()
    }
    .validate()?;

    let plain = LosOptions::with_samples(samples);
    let fresnel = plain.fresnel(link.fresnel_factor, link.wavelength());

    let equirectangular_m = distance::equirectangular(&from, &to);
    let midpoint_clearance_m = fresnel
        .fresnel
        .map_or(0.0, |f| f.clearance(equirectangular_m / 2.0, equirectangular_m / 2.0));

    Ok(LosReport {
        from,
        to,
        distance_m: distance::haversine(&from, &to),
        equirectangular_m,
        straight_line_m: distance::straight_line(&from, &to),
        line_of_sight: grid.line_of_sight(&from, &to, &plain)?,
        fresnel_clear: grid.line_of_sight(&from, &to, &fresnel)?,
        midpoint_clearance_m,
        profile: grid.terrain_profile(&from, &to, samples)?,
    })
}

/// Human-readable path summary.
pub fn format_los_text(report: &LosReport) -> String {
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    let mut out = String::new();
    let _ = writeln!(
        out,
        "From:            {:.6}, {:.6} (+{:.1} m)",
        report.from.lat, report.from.lng, report.from.alt
    );
    let _ = writeln!(
        out,
        "To:              {:.6}, {:.6} (+{:.1} m)",
        report.to.lat, report.to.lng, report.to.alt
    );
    let _ = writeln!(out, "Distance:        {:.1} m", report.distance_m);
    let _ = writeln!(out, "Line of sight:   {}", yes_no(report.line_of_sight));
    let _ = writeln!(
        out,
        "Fresnel clear:   {} ({:.1} m needed at mid-path)",
        yes_no(report.fresnel_clear),
        report.midpoint_clearance_m
    );
    let _ = writeln!(
        out,
        "Highest terrain: {:.1} m over {} samples",
        report.profile.max_elevation(),
        report.profile.len()
    );
    out
}
