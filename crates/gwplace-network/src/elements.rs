//! Network elements.

use gwplace_common::GeoPoint;
use serde::{Deserialize, Serialize};

/// A sensor that needs a gateway. `location.alt` is its antenna height above ground.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndDevice {
    pub id: String,
    pub location: GeoPoint,
    /// Index of the serving gateway in the owning network.
    pub(crate) assigned_gateway: Option<usize>,
    pub(crate) distance_to_gateway: f64,
}

impl EndDevice {
    /// Unassigned device.
    pub fn new(id: impl Into<String>, location: GeoPoint) -> Self {
        Self {
            id: id.into(),
            location,
            assigned_gateway: None,
            distance_to_gateway: 0.0,
        }
    }

    /// Index of the serving gateway, if any.
    pub fn assigned_gateway(&self) -> Option<usize> {
        self.assigned_gateway
    }

    /// Link distance to the serving gateway in meters.
    pub fn distance_to_gateway(&self) -> Option<f64> {
        self.assigned_gateway.map(|_| self.distance_to_gateway)
    }

    pub fn is_connected(&self) -> bool {
        self.assigned_gateway.is_some()
    }

    pub(crate) fn unassign(&mut self) {
        self.assigned_gateway = None;
        self.distance_to_gateway = 0.0;
    }
}

/// A gateway. `location.alt` is its antenna height above ground.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gateway {
    pub id: String,
    pub location: GeoPoint,
    /// Indices of the end devices this gateway serves, ascending.
    pub(crate) connected_devices: Vec<usize>,
}

impl Gateway {
    /// Gateway serving no devices.
    pub fn new(id: impl Into<String>, location: GeoPoint) -> Self {
        Self {
            id: id.into(),
            location,
            connected_devices: Vec::new(),
        }
    }

    pub fn connected_devices(&self) -> &[usize] {
        &self.connected_devices
    }

    pub fn num_connected(&self) -> usize {
        self.connected_devices.len()
    }
}
