//! The network and its connectivity engine.

use crate::{DistanceHistogram, EndDevice, Gateway, Result};
use gwplace_common::{BoundingBox, GeoPoint};
use gwplace_dem::ElevationGrid;
use gwplace_link::LinkParams;
use gwplace_metrics::metric_defs::{
    CONNECTED_DEVICES, CONNECT_CALLS, CONNECT_DURATION, TOTAL_DISTANCE, UNCONNECTED_DEVICES,
};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::trace;

/// Gateways, end devices and the terrain they sit on.
///
/// Elements live in two vectors owned by the network and refer to each other
/// by index. Assignments are only ever written by [`connect`](Self::connect)
/// and [`disconnect`](Self::disconnect); adding, removing or replacing
/// gateways drops them so a stale index is never observable.
#[derive(Debug, Clone)]
pub struct Network {
    grid: Arc<ElevationGrid>,
    params: LinkParams,
    gateways: Vec<Gateway>,
    end_devices: Vec<EndDevice>,

    // Derived by connect()
    histogram: DistanceHistogram,
    total_distance: f64,
    connected: usize,

    next_gateway_id: usize,
}

impl Network {
    /// Empty network over `grid` using validated link parameters.
    pub fn new(grid: Arc<ElevationGrid>, params: LinkParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            grid,
            params,
            gateways: Vec::new(),
            end_devices: Vec::new(),
            histogram: DistanceHistogram::default(),
            total_distance: 0.0,
            connected: 0,
            next_gateway_id: 0,
        })
    }

    /// Change the histogram bin width. Takes effect on the next `connect()`.
    pub fn set_histogram_bin(&mut self, bin_width_m: f64) -> Result<()> {
        self.histogram = DistanceHistogram::new(bin_width_m)?;
        self.disconnect();
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn grid(&self) -> &Arc<ElevationGrid> {
        &self.grid
    }

    pub fn params(&self) -> &LinkParams {
        &self.params
    }

    pub fn gateways(&self) -> &[Gateway] {
        &self.gateways
    }

    pub fn end_devices(&self) -> &[EndDevice] {
        &self.end_devices
    }

    pub fn gateway(&self, idx: usize) -> Option<&Gateway> {
        self.gateways.get(idx)
    }

    pub fn end_device(&self, idx: usize) -> Option<&EndDevice> {
        self.end_devices.get(idx)
    }

    pub fn num_gateways(&self) -> usize {
        self.gateways.len()
    }

    pub fn num_end_devices(&self) -> usize {
        self.end_devices.len()
    }

    /// Current gateway positions, in index order.
    pub fn gateway_locations(&self) -> Vec<GeoPoint> {
        self.gateways.iter().map(|g| g.location).collect()
    }

    /// Bounding box of all end devices.
    pub fn end_device_bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.end_devices.iter().map(|d| &d.location))
    }

    /// Bounding box of every gateway and end device.
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(
            self.gateways
                .iter()
                .map(|g| &g.location)
                .chain(self.end_devices.iter().map(|d| &d.location)),
        )
    }

    // ========================================================================
    // Statistics (as of the last connect)
    // ========================================================================

    pub fn connected_count(&self) -> usize {
        self.connected
    }

    pub fn unconnected_count(&self) -> usize {
        self.end_devices.len() - self.connected
    }

    pub fn is_fully_connected(&self) -> bool {
        self.unconnected_count() == 0
    }

    /// Sum of assigned link distances in meters.
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// Longest assigned link in meters, 0 with no links.
    pub fn max_distance(&self) -> f64 {
        self.end_devices
            .iter()
            .filter_map(EndDevice::distance_to_gateway)
            .fold(0.0, f64::max)
    }

    pub fn histogram(&self) -> &DistanceHistogram {
        &self.histogram
    }

    /// Indices of end devices without a gateway.
    pub fn unconnected_devices(&self) -> impl Iterator<Item = usize> + '_ {
        self.end_devices
            .iter()
            .enumerate()
            .filter(|(_, d)| !d.is_connected())
            .map(|(i, _)| i)
    }

    // ========================================================================
    // Structural operations
    // ========================================================================

    /// Add an end device and return its index.
    pub fn add_end_device(&mut self, id: impl Into<String>, location: GeoPoint) -> usize {
        self.end_devices.push(EndDevice::new(id, location));
        self.end_devices.len() - 1
    }

    /// Add a gateway with a generated `gw-<n>` id and return its index.
    pub fn add_gateway(&mut self, location: GeoPoint) -> usize {
        let id = loop {
            let candidate = format!("gw-{}", self.next_gateway_id);
            self.next_gateway_id += 1;
            if !self.gateways.iter().any(|g| g.id == candidate) {
                break candidate;
            }
        };
        self.add_gateway_with_id(id, location)
    }

    /// Add a gateway with an explicit id and return its index.
    pub fn add_gateway_with_id(&mut self, id: impl Into<String>, location: GeoPoint) -> usize {
        self.disconnect();
        self.gateways.push(Gateway::new(id, location));
        self.gateways.len() - 1
    }

    /// Remove a gateway. Later gateways shift down by one index.
    pub fn remove_gateway(&mut self, idx: usize) -> Option<Gateway> {
        if idx >= self.gateways.len() {
            return None;
        }
        self.disconnect();
        Some(self.gateways.remove(idx))
    }

    pub fn clear_gateways(&mut self) {
        self.disconnect();
        self.gateways.clear();
    }

    /// Replace all gateways, e.g. to restore a saved configuration.
    pub fn set_gateways(&mut self, gateways: Vec<Gateway>) {
        self.disconnect();
        self.gateways = gateways;
        for gw in &mut self.gateways {
            gw.connected_devices.clear();
        }
    }

    /// Move a gateway. Assignments are left as they are until the next `connect()`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    pub fn set_gateway_location(&mut self, idx: usize, location: GeoPoint) {
        self.gateways[idx].location = location;
    }

    /// Shift a gateway by `delta` in lat/lng; its altitude is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    pub fn translate_gateway(&mut self, idx: usize, delta: GeoPoint) {
        self.gateways[idx].location += delta;
    }

    // ========================================================================
    // Connectivity engine
    // ========================================================================

    /// Assign every end device to its nearest reachable gateway.
    ///
    /// The per-device search runs in parallel against a read-only view of the
    /// network; the results are then installed sequentially. Returns the
    /// number of connected end devices.
    pub fn connect(&mut self) -> usize {
        let start = Instant::now();
        metrics::counter!(CONNECT_CALLS.name).increment(1);

        let best: Vec<Option<(usize, f64)>> = if self.gateways.is_empty() {
            Vec::new()
        } else {
            let grid = self.grid.as_ref();
            let params = &self.params;
            let gateways = &self.gateways;
            self.end_devices
                .par_iter()
                .map(|dev| nearest_reachable(grid, params, gateways, &dev.location))
                .collect()
        };

        self.disconnect();
        for (dev_idx, slot) in best.into_iter().enumerate() {
            let Some((gw_idx, distance)) = slot else {
                continue;
            };
            let dev = &mut self.end_devices[dev_idx];
            dev.assigned_gateway = Some(gw_idx);
            dev.distance_to_gateway = distance;
            self.gateways[gw_idx].connected_devices.push(dev_idx);

            self.total_distance += distance;
            self.connected += 1;
            self.histogram.record(distance);
        }
        debug_assert!(self.assignments_consistent());

        metrics::gauge!(CONNECTED_DEVICES.name).set(self.connected as f64);
        metrics::gauge!(UNCONNECTED_DEVICES.name).set(self.unconnected_count() as f64);
        metrics::gauge!(TOTAL_DISTANCE.name).set(self.total_distance);
        metrics::histogram!(CONNECT_DURATION.name).record(start.elapsed().as_micros() as f64);
        trace!(
            gateways = self.gateways.len(),
            connected = self.connected,
            total_distance = self.total_distance,
            "connect"
        );

        self.connected
    }

    /// Clear every assignment and reset the derived statistics.
    pub fn disconnect(&mut self) {
        for dev in &mut self.end_devices {
            dev.unassign();
        }
        for gw in &mut self.gateways {
            gw.connected_devices.clear();
        }
        self.histogram.clear();
        self.total_distance = 0.0;
        self.connected = 0;
    }

    /// Whether device assignments and gateway device lists mirror each other.
    pub fn assignments_consistent(&self) -> bool {
        let mut listed = 0;
        for (gw_idx, gw) in self.gateways.iter().enumerate() {
            for &dev_idx in &gw.connected_devices {
                match self.end_devices.get(dev_idx) {
                    Some(dev) if dev.assigned_gateway == Some(gw_idx) => listed += 1,
                    _ => return false,
                }
            }
        }
        let assigned = self
            .end_devices
            .iter()
            .filter(|d| d.assigned_gateway.is_some())
            .count();
        assigned == listed && assigned == self.connected
    }
}

/// Closest gateway `device` can reach; ties go to the lowest index.
fn nearest_reachable(
    grid: &ElevationGrid,
    params: &LinkParams,
    gateways: &[Gateway],
    device: &GeoPoint,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, gw) in gateways.iter().enumerate() {
        if let Some(d) = params.evaluate(grid, &gw.location, device) {
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((idx, d));
            }
        }
    }
    best
}
