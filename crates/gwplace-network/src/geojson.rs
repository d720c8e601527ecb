//! GeoJSON import and export of networks.
//!
//! # Input format
//!
//! A `FeatureCollection` of `Point` features with `[lng, lat]` coordinates and
//! a `type` property:
//!
//! ```json
//! { "type": "Feature",
//!   "geometry": { "type": "Point", "coordinates": [-67.4587, -45.8254] },
//!   "properties": { "type": "gateway", "id": "gw-a", "height": 10.0 } }
//! ```
//!
//! Gateways need `id` and `height`; end devices need `id` and default to a
//! height of 0 m. Features typed `connection` are derived data written by
//! [`Network::to_feature_collection`] and are skipped on load.

use crate::{Network, NetworkError, Result};
use gwplace_common::{BoundingBox, GeoPoint};
use gwplace_dem::ElevationGrid;
use gwplace_link::LinkParams;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

const GATEWAY: &str = "gateway";
const END_DEVICE: &str = "end_device";
const CONNECTION: &str = "connection";

// ============================================================================
// GeoJSON types
// ============================================================================

/// A GeoJSON geometry; only the parts gwplace reads are typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub coordinates: Value,
}

impl Geometry {
    pub fn point(p: &GeoPoint) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: json!([p.lng, p.lat]),
        }
    }

    pub fn line_string(a: &GeoPoint, b: &GeoPoint) -> Self {
        Self {
            kind: "LineString".to_string(),
            coordinates: json!([[a.lng, a.lat], [b.lng, b.lat]]),
        }
    }
}

/// A GeoJSON feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: Geometry,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(geometry: Geometry, properties: Map<String, Value>) -> Self {
        Self {
            kind: "Feature".to_string(),
            geometry,
            properties,
        }
    }
}

/// A GeoJSON feature collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
            bbox: None,
            properties: Map::new(),
        }
    }

    /// Read a collection from a GeoJSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    /// Write the collection as pretty-printed GeoJSON.
    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), self)?;
        Ok(())
    }
}

// ============================================================================
// Import
// ============================================================================

impl Network {
    /// Build a network from gateway and end-device features.
    pub fn from_feature_collection(
        fc: &FeatureCollection,
        grid: Arc<ElevationGrid>,
        params: LinkParams,
    ) -> Result<Self> {
        let mut network = Network::new(grid, params)?;

        for (idx, feature) in fc.features.iter().enumerate() {
            let kind = feature.properties.get("type").and_then(Value::as_str);
            if kind == Some(CONNECTION) {
                continue;
            }
            if feature.geometry.kind != "Point" {
                return Err(NetworkError::UnsupportedGeometry {
                    feature: idx,
                    geometry: feature.geometry.kind.clone(),
                });
            }
            let (lat, lng) = point_coordinates(idx, &feature.geometry.coordinates)?;
            if !network.grid().in_grid(lat, lng) {
                return Err(NetworkError::OutsideGrid {
                    feature: idx,
                    lat,
                    lng,
                });
            }
            let id = id_property(idx, &feature.properties)?;

            match kind {
                Some(GATEWAY) => {
                    let height = height_property(idx, &feature.properties)?
                        .ok_or(NetworkError::MissingField {
                            feature: idx,
                            field: "height",
                        })?;
                    network.add_gateway_with_id(id, GeoPoint::new(lat, lng, height));
                }
                Some(END_DEVICE) => {
                    let height = height_property(idx, &feature.properties)?.unwrap_or(0.0);
                    network.add_end_device(id, GeoPoint::new(lat, lng, height));
                }
                other => {
                    return Err(NetworkError::UnknownFeatureType {
                        feature: idx,
                        kind: other.unwrap_or_default().to_string(),
                    })
                }
            }
        }

        info!(
            gateways = network.num_gateways(),
            end_devices = network.num_end_devices(),
            "Loaded network"
        );
        Ok(network)
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Export nodes, active links and summary statistics as GeoJSON.
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let gateways = self.gateways();
        let mut features = Vec::with_capacity(gateways.len() + 2 * self.num_end_devices());

        for gw in gateways {
            let mut props = Map::new();
            props.insert("type".into(), GATEWAY.into());
            props.insert("id".into(), gw.id.clone().into());
            props.insert("height".into(), gw.location.alt.into());
            props.insert("connected_devices".into(), gw.num_connected().into());
            features.push(Feature::new(Geometry::point(&gw.location), props));
        }

        for dev in self.end_devices() {
            let assigned = dev.assigned_gateway().and_then(|i| gateways.get(i));
            let mut props = Map::new();
            props.insert("type".into(), END_DEVICE.into());
            props.insert("id".into(), dev.id.clone().into());
            props.insert("height".into(), dev.location.alt.into());
            props.insert(
                "assigned_gateway".into(),
                assigned.map_or(Value::Null, |g| g.id.clone().into()),
            );
            features.push(Feature::new(Geometry::point(&dev.location), props));
        }

        for dev in self.end_devices() {
            let (Some(gw), Some(distance)) = (
                dev.assigned_gateway().and_then(|i| gateways.get(i)),
                dev.distance_to_gateway(),
            ) else {
                continue;
            };
            let mut props = Map::new();
            props.insert("type".into(), CONNECTION.into());
            props.insert("from".into(), gw.id.clone().into());
            props.insert("to".into(), dev.id.clone().into());
            props.insert("distance".into(), distance.into());
            features.push(Feature::new(
                Geometry::line_string(&gw.location, &dev.location),
                props,
            ));
        }

        let grid = self.grid();
        let network_bbox = self.bounds();
        let properties = json!({
            "gateways": gateways.len(),
            "end_devices": self.num_end_devices(),
            "connected": self.connected_count(),
            "disconnected": self.unconnected_count(),
            "total_distance": self.total_distance(),
            "max_distance": self.max_distance(),
            "elevation_bbox": grid.bounds().to_geojson(),
            "min_altitude": grid.min_altitude(),
            "max_altitude": grid.max_altitude(),
            "network_bbox": network_bbox.map(|b| b.to_geojson()),
            "histogram": self.histogram(),
        });

        FeatureCollection {
            kind: "FeatureCollection".to_string(),
            features,
            bbox: network_bbox.as_ref().map(BoundingBox::to_geojson),
            properties: match properties {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        }
    }
}

fn point_coordinates(feature: usize, coordinates: &Value) -> Result<(f64, f64)> {
    let invalid = |reason: &str| NetworkError::InvalidCoordinates {
        feature,
        reason: reason.to_string(),
    };
    let arr = coordinates
        .as_array()
        .ok_or_else(|| invalid("expected an array"))?;
    if arr.len() < 2 {
        return Err(invalid("expected at least [lng, lat]"));
    }
    let lng = arr[0].as_f64().ok_or_else(|| invalid("longitude is not a number"))?;
    let lat = arr[1].as_f64().ok_or_else(|| invalid("latitude is not a number"))?;
    if !GeoPoint::new(lat, lng, 0.0).is_valid_coordinate() {
        return Err(invalid(&format!("({}, {}) is out of range", lat, lng)));
    }
    Ok((lat, lng))
}

fn id_property(feature: usize, props: &Map<String, Value>) -> Result<String> {
    match props.get("id") {
        None | Some(Value::Null) => Err(NetworkError::MissingField {
            feature,
            field: "id",
        }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(NetworkError::InvalidField {
            feature,
            field: "id",
            reason: format!("expected a string, found {}", other),
        }),
    }
}

fn height_property(feature: usize, props: &Map<String, Value>) -> Result<Option<f64>> {
    let Some(value) = props.get("height").filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    match value.as_f64() {
        Some(h) if h.is_finite() && h >= 0.0 => Ok(Some(h)),
        _ => Err(NetworkError::InvalidField {
            feature,
            field: "height",
            reason: format!("expected a non-negative number, found {}", value),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Arc<ElevationGrid> {
        Arc::new(
            ElevationGrid::from_points(&[
                (0.0, 0.0, 0.0),
                (0.0, 1.0, 0.0),
                (1.0, 0.0, 0.0),
                (1.0, 1.0, 0.0),
            ])
            .unwrap(),
        )
    }

    fn parse(s: &str) -> FeatureCollection {
        serde_json::from_str(s).unwrap()
    }

    fn load(s: &str) -> Result<Network> {
        Network::from_feature_collection(&parse(s), grid(), LinkParams::default())
    }

    fn collection(feature: &str) -> String {
        format!(r#"{{"type":"FeatureCollection","features":[{}]}}"#, feature)
    }

    #[test]
    fn test_load_gateways_and_devices() {
        let net = load(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":{"type":"Point","coordinates":[0.5,0.25]},
                 "properties":{"type":"gateway","id":"g1","height":12}},
                {"type":"Feature","geometry":{"type":"Point","coordinates":[0.6,0.3,99]},
                 "properties":{"type":"end_device","id":7}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(net.num_gateways(), 1);
        assert_eq!(net.gateways()[0].id, "g1");
        assert_eq!(net.gateways()[0].location, GeoPoint::new(0.25, 0.5, 12.0));
        assert_eq!(net.end_devices()[0].id, "7");
        assert_eq!(net.end_devices()[0].location, GeoPoint::new(0.3, 0.6, 0.0));
    }

    #[test]
    fn test_rejects_non_point() {
        let err = load(&collection(
            r#"{"type":"Feature","geometry":{"type":"Polygon","coordinates":[]},"properties":{"type":"gateway"}}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, NetworkError::UnsupportedGeometry { feature: 0, ref geometry } if geometry == "Polygon"));
    }

    #[test]
    fn test_rejects_bad_coordinates() {
        let err = load(&collection(
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0.5]},"properties":{"type":"end_device","id":"a"}}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, NetworkError::InvalidCoordinates { .. }));

        let err = load(&collection(
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0.5, 95.0]},"properties":{"type":"end_device","id":"a"}}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, NetworkError::InvalidCoordinates { .. }));
    }

    #[test]
    fn test_rejects_unknown_type() {
        let err = load(&collection(
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0.5,0.5]},"properties":{"type":"router","id":"a"}}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, NetworkError::UnknownFeatureType { ref kind, .. } if kind == "router"));

        let err = load(&collection(
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0.5,0.5]},"properties":{"id":"a"}}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, NetworkError::UnknownFeatureType { ref kind, .. } if kind.is_empty()));
    }

    #[test]
    fn test_rejects_points_outside_grid() {
        let err = load(&collection(
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[5.0,5.0]},"properties":{"type":"end_device","id":"far"}}"#,
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            NetworkError::OutsideGrid { feature: 0, lat, lng } if lat == 5.0 && lng == 5.0
        ));

        let err = load(&collection(
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[-0.5,0.5]},"properties":{"type":"gateway","id":"g","height":10}}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, NetworkError::OutsideGrid { .. }));
    }

    #[test]
    fn test_gateway_requires_height() {
        let err = load(&collection(
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0.5,0.5]},"properties":{"type":"gateway","id":"g"}}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, NetworkError::MissingField { field: "height", .. }));
    }

    #[test]
    fn test_missing_id_and_bad_height() {
        let err = load(&collection(
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0.5,0.5]},"properties":{"type":"end_device"}}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, NetworkError::MissingField { field: "id", .. }));

        let err = load(&collection(
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0.5,0.5]},"properties":{"type":"end_device","id":"d","height":-3}}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, NetworkError::InvalidField { field: "height", .. }));

        let err = load(&collection(
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0.5,0.5]},"properties":{"type":"end_device","id":"d","height":"tall"}}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, NetworkError::InvalidField { field: "height", .. }));
    }

    #[test]
    fn test_export_shape() {
        let mut net = Network::new(grid(), LinkParams::default()).unwrap();
        net.add_gateway_with_id("g", GeoPoint::new(0.5, 0.5, 10.0));
        net.add_end_device("near", GeoPoint::new(0.5, 0.505, 1.0));
        net.add_end_device("far", GeoPoint::new(0.9, 0.9, 1.0));
        net.connect();

        let fc = net.to_feature_collection();
        assert_eq!(fc.kind, "FeatureCollection");
        assert_eq!(fc.features.len(), 4);

        let link = &fc.features[3];
        assert_eq!(link.geometry.kind, "LineString");
        assert_eq!(link.properties["type"], "connection");
        assert_eq!(link.properties["from"], "g");
        assert_eq!(link.properties["to"], "near");

        assert_eq!(fc.features[1].properties["assigned_gateway"], "g");
        assert_eq!(fc.features[2].properties["assigned_gateway"], Value::Null);

        assert_eq!(fc.properties["gateways"], 1);
        assert_eq!(fc.properties["connected"], 1);
        assert_eq!(fc.properties["disconnected"], 1);
        assert_eq!(fc.properties["elevation_bbox"], json!([0.0, 0.0, 1.0, 1.0]));
        assert_eq!(fc.bbox, Some([0.5, 0.5, 0.9, 0.9]));
        assert_eq!(fc.properties["histogram"]["counts"], json!([0, 0, 1]));
    }
}
