//! Connectivity engine properties over synthetic terrain.

use approx::assert_relative_eq;
use gwplace_common::{distance, GeoPoint};
use gwplace_dem::ElevationGrid;
use gwplace_link::LinkParams;
use gwplace_network::{FeatureCollection, Network};
use std::sync::Arc;

const STEP: f64 = 0.001;
const N: usize = 41;

/// ~4.5 km square with a 300 m hill in the middle.
fn hill_grid() -> Arc<ElevationGrid> {
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
    Arc::new(ElevationGrid::from_points(&points).unwrap())
}

fn scattered(count: usize, alt: f64) -> Vec<GeoPoint> {
    let span = (N - 1) as f64 * STEP;
    (0..count)
        .map(|k| {
            let a = ((k as f64 * 0.618_033_988_75) % 1.0) * span;
            let b = ((k as f64 * 0.414_213_562_37 + 0.3) % 1.0) * span;
            GeoPoint::new(-45.8 + a, -67.5 + b, alt)
        })
        .collect()
}

fn hill_network() -> Network {
    let mut net = Network::new(hill_grid(), LinkParams::default()).unwrap();
    for (i, p) in scattered(60, 1.0).into_iter().enumerate() {
        net.add_end_device(format!("dev-{}", i), p);
    }
    for p in [
        GeoPoint::new(-45.795, -67.495, 10.0),
        GeoPoint::new(-45.765, -67.465, 10.0),
        GeoPoint::new(-45.795, -67.465, 10.0),
    ] {
        net.add_gateway(p);
    }
    net
}

#[test]
fn test_assignments_are_feasible_and_bidirectional() {
    let mut net = hill_network();
    let connected = net.connect();
    assert!(connected > 0);
    assert!(net.assignments_consistent());

    let params = net.params().clone();
    let grid = net.grid().clone();
    let los = params.los_options();
    let mut total = 0.0;

    for (dev_idx, dev) in net.end_devices().iter().enumerate() {
        match dev.assigned_gateway() {
            Some(g) => {
                let gw = &net.gateways()[g];
                assert!(gw.connected_devices().contains(&dev_idx));
                let d = dev.distance_to_gateway().unwrap();
                assert!(d <= params.max_range_m);
                assert_relative_eq!(d, distance::equirectangular(&gw.location, &dev.location), max_relative = 1e-9);
                assert!(grid.line_of_sight(&gw.location, &dev.location, &los).unwrap());
                total += d;

                // No other reachable gateway is strictly closer.
                for other in net.gateways() {
                    if let Some(od) = params.evaluate(&grid, &other.location, &dev.location) {
                        assert!(od >= d);
                    }
                }
            }
            None => {
                for gw in net.gateways() {
                    assert!(params.evaluate(&grid, &gw.location, &dev.location).is_none());
                    assert!(!gw.connected_devices().contains(&dev_idx));
                }
            }
        }
    }

    assert_relative_eq!(total, net.total_distance(), max_relative = 1e-9);
    assert_eq!(net.histogram().total(), connected);
    assert_eq!(connected + net.unconnected_count(), 60);
}

#[test]
fn test_connect_is_repeatable() {
    let mut net = hill_network();
    let first = net.connect();
    let before: Vec<_> = net.end_devices().iter().map(|d| d.assigned_gateway()).collect();
    assert_eq!(net.connect(), first);
    let after: Vec<_> = net.end_devices().iter().map(|d| d.assigned_gateway()).collect();
    assert_eq!(before, after);
}

#[test]
fn test_disconnect_then_connect_without_gateways() {
    let mut net = hill_network();
    net.connect();
    net.disconnect();
    assert_eq!(net.connected_count(), 0);

    net.clear_gateways();
    assert_eq!(net.connect(), 0);
    assert!(net.end_devices().iter().all(|d| d.assigned_gateway().is_none()));
    assert_eq!(net.unconnected_count(), 60);
    assert!(net.assignments_consistent());
}

#[test]
fn test_fresnel_never_adds_links() {
    let mut plain = hill_network();
    let plain_count = plain.connect();

    let params = LinkParams {
        fresnel: true,
        ..LinkParams::default()
    };
    let mut fresnel = Network::new(hill_grid(), params).unwrap();
    for dev in plain.end_devices() {
        fresnel.add_end_device(dev.id.clone(), dev.location);
    }
    fresnel.set_gateways(plain.gateways().to_vec());
    let fresnel_count = fresnel.connect();

    assert!(fresnel_count <= plain_count);
    for (a, b) in plain.end_devices().iter().zip(fresnel.end_devices()) {
        if b.is_connected() {
            assert!(a.is_connected());
        }
    }
}

#[test]
fn test_export_import_round_trip() {
    let mut net = hill_network();
    let links = net.connect();

    let file = tempfile::NamedTempFile::new().unwrap();
    net.to_feature_collection().write_to_path(file.path()).unwrap();

    let fc = FeatureCollection::from_path(file.path()).unwrap();
    assert_eq!(fc.properties["connected"], links);
    let line_strings = fc
        .features
        .iter()
        .filter(|f| f.geometry.kind == "LineString")
        .count();
    assert_eq!(line_strings, links);

    let mut loaded = Network::from_feature_collection(&fc, hill_grid(), LinkParams::default()).unwrap();
    assert_eq!(loaded.num_gateways(), net.num_gateways());
    assert_eq!(loaded.num_end_devices(), net.num_end_devices());
    for (a, b) in net.gateways().iter().zip(loaded.gateways()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.location, b.location);
    }
    for (a, b) in net.end_devices().iter().zip(loaded.end_devices()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.location.alt, b.location.alt);
    }
    assert_eq!(loaded.connect(), links);
}
