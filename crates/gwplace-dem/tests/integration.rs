//! Integration tests for gwplace-dem over synthetic terrain.

use gwplace_common::GeoPoint;
use gwplace_dem::{distance, ElevationGrid, LosOptions};

const STEP: f64 = 0.001;
const N: usize = 41;

/// A 41x41 grid (~4.5 km square) with a 300 m Gaussian hill in the middle.
fn hill_grid() -> (ElevationGrid, Vec<(f64, f64, f64)>) {
    let center = (N as f64 - 1.0) / 2.0;
    let mut points = Vec::with_capacity(N * N);
    for i in 0..N {
        for j in 0..N {
            let di = i as f64 - center;
            let dj = j as f64 - center;
            let alt = 300.0 * (-(di * di + dj * dj) / 40.0).exp();
            points.push((-45.8 + i as f64 * STEP, -67.5 + j as f64 * STEP, alt));
        }
    }
    // Loaders hand us points in arbitrary order.
    points.reverse();
    let grid = ElevationGrid::from_points(&points).expect("valid grid");
    (grid, points)
}

fn flat_grid() -> ElevationGrid {
    let mut points = Vec::new();
    for i in 0..N {
        for j in 0..N {
            points.push((-45.8 + i as f64 * STEP, -67.5 + j as f64 * STEP, 42.0));
        }
    }
    ElevationGrid::from_points(&points).expect("valid grid")
}

/// Deterministic pseudo-random coordinates inside the grid.
fn sample_points(count: usize) -> Vec<GeoPoint> {
    let span = (N - 1) as f64 * STEP;
    (0..count)
        .map(|k| {
            let a = ((k as f64 * 0.618_033_988_75) % 1.0) * span;
            let b = ((k as f64 * 0.414_213_562_37 + 0.3) % 1.0) * span;
            GeoPoint::new(-45.8 + a, -67.5 + b, (k % 7) as f64)
        })
        .collect()
}

#[test]
fn test_samples_are_reproduced() {
    let (grid, points) = hill_grid();
    for (lat, lng, alt) in points {
        let got = grid.bilinear_interpolation(lat, lng).unwrap();
        assert!(
            (got - alt).abs() < 1e-9,
            "({}, {}) expected {} got {}",
            lat,
            lng,
            alt,
            got
        );
    }
}

#[test]
fn test_altitude_range() {
    let (grid, _) = hill_grid();
    assert!((grid.max_altitude() - 300.0).abs() < 1e-9);
    assert!(grid.min_altitude() > 0.0 && grid.min_altitude() < 1.0);
}

#[test]
fn test_flat_terrain_always_clear() {
    let grid = flat_grid();
    let pts = sample_points(30);
    for a in &pts {
        for b in &pts {
            assert!(grid.line_of_sight(a, b, &LosOptions::default()).unwrap());
        }
    }
}

#[test]
fn test_hill_blocks_opposite_sides() {
    let (grid, _) = hill_grid();
    let west = GeoPoint::new(-45.78, -67.499, 5.0);
    let east = GeoPoint::new(-45.78, -67.461, 5.0);
    assert!(!grid.line_of_sight(&west, &east, &LosOptions::default()).unwrap());

    // Fresnel clearance can only make a link harder to close.
    let north = GeoPoint::new(-45.761, -67.499, 5.0);
    let opts = LosOptions::default().fresnel(0.6, 0.3276);
    if grid.line_of_sight(&west, &north, &opts).unwrap() {
        assert!(grid.line_of_sight(&west, &north, &LosOptions::default()).unwrap());
    }
}

#[test]
fn test_los_is_symmetric_on_hill() {
    let (grid, _) = hill_grid();
    let pts = sample_points(25);
    let opts = LosOptions::default();
    for a in &pts {
        for b in &pts {
            assert_eq!(
                grid.line_of_sight(a, b, &opts).unwrap(),
                grid.line_of_sight(b, a, &opts).unwrap()
            );
        }
    }
}

#[test]
fn test_distance_properties() {
    let pts = sample_points(20);
    for a in &pts {
        for b in &pts {
            let e = distance::equirectangular(a, b);
            assert_eq!(e, distance::equirectangular(b, a));
            assert!((distance::squared_distance(a, b) - e * e).abs() <= 1e-6 * e.max(1.0) * e.max(1.0));
        }
    }
}

#[test]
fn test_profile_spans_path() {
    let (grid, _) = hill_grid();
    let west = GeoPoint::new(-45.78, -67.5, 0.0);
    let east = GeoPoint::new(-45.78, -67.46, 0.0);
    let profile = grid.terrain_profile(&west, &east, 40).unwrap();
    assert_eq!(profile.len(), 41);
    assert!((profile.max_elevation() - 300.0).abs() < 1e-6);
    assert!((profile.distances[40] - distance::haversine(&west, &east)).abs() < 1e-6);
}
