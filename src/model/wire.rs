//! JSON wire shape shared with the relay server and the local map store.
//!
//! ```text
//! Waypoint: {"type": "start"|"intermediate"|"destination",
//!            "x_offset": f, "y_offset": f, "z_offset": f}
//! Path:     {"destination": s, "beacon_name": s, "node_count": n,
//!            "nodes": {"index": [Waypoint, ...]}}
//! ```
//!
//! Decoding is all-or-nothing: a count mismatch, an unknown `type` or a
//! sequence that is not start/intermediate*/destination rejects the path.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::NavError;

use super::path::Path;
use super::waypoint::{Waypoint, WaypointKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaypointWire {
    #[serde(rename = "type")]
    pub kind: WaypointKind,
    pub x_offset: f64,
    pub y_offset: f64,
    pub z_offset: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodesWire {
    pub index: Vec<WaypointWire>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathWire {
    pub destination: String,
    pub beacon_name: String,
    pub node_count: usize,
    pub nodes: NodesWire,
}

impl From<&Waypoint> for WaypointWire {
    fn from(wp: &Waypoint) -> Self {
        let o = wp.offset();
        Self {
            kind: wp.kind(),
            x_offset: o.x,
            y_offset: o.y,
            z_offset: o.z,
        }
    }
}

impl From<WaypointWire> for Waypoint {
    fn from(w: WaypointWire) -> Self {
        Waypoint::new(w.kind, Vector3::new(w.x_offset, w.y_offset, w.z_offset))
    }
}

impl From<Path> for PathWire {
    fn from(path: Path) -> Self {
        let (destination, beacon_name, waypoints) = path.into_parts();
        Self {
            destination,
            beacon_name,
            node_count: waypoints.len(),
            nodes: NodesWire {
                index: waypoints.iter().map(WaypointWire::from).collect(),
            },
        }
    }
}

impl TryFrom<PathWire> for Path {
    type Error = NavError;

    fn try_from(wire: PathWire) -> Result<Self, Self::Error> {
        if wire.node_count != wire.nodes.index.len() {
            return Err(NavError::MalformedPath(format!(
                "node_count is {} but nodes.index holds {} entries",
                wire.node_count,
                wire.nodes.index.len()
            )));
        }
        let waypoints = wire.nodes.index.into_iter().map(Waypoint::from).collect();
        Path::new(wire.destination, wire.beacon_name, waypoints)
    }
}

impl Path {
    /// Encode to the wire JSON shape.
    pub fn to_json(&self) -> Result<String, NavError> {
        serde_json::to_string(self).map_err(|e| NavError::MalformedPath(e.to_string()))
    }

    /// Encode to a JSON value (for merging extra fields such as `uid`).
    pub fn to_json_value(&self) -> Result<serde_json::Value, NavError> {
        serde_json::to_value(self).map_err(|e| NavError::MalformedPath(e.to_string()))
    }

    /// Decode from the wire JSON shape.
    pub fn from_json(json: &str) -> Result<Self, NavError> {
        Self::from_json_slice(json.as_bytes())
    }

    /// Decode from raw bytes, e.g. an HTTP response body.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, NavError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(NavError::MalformedPath("empty document".to_string()));
        }
        let wire: PathWire =
            serde_json::from_slice(bytes).map_err(|e| NavError::MalformedPath(e.to_string()))?;
        Path::try_from(wire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_path() -> Path {
        Path::new(
            "Room 204",
            "pi",
            vec![
                Waypoint::start(Vector3::new(0.25, -1.5, -0.75)),
                Waypoint::intermediate(Vector3::new(0.1, 0.0, -3.2)),
                Waypoint::intermediate(Vector3::new(-2.0, 0.05, 0.0)),
                Waypoint::destination(Vector3::new(0.0, 0.0, -1.125)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_encode_shape() {
        let value = sample_path().to_json_value().unwrap();
        assert_eq!(value["destination"], "Room 204");
        assert_eq!(value["beacon_name"], "pi");
        assert_eq!(value["node_count"], 4);
        assert_eq!(value["nodes"]["index"][0]["type"], "start");
        assert_eq!(value["nodes"]["index"][3]["type"], "destination");
        assert_eq!(value["nodes"]["index"][1]["z_offset"], -3.2);
    }

    #[test]
    fn test_roundtrip_preserves_sequence() {
        let path = sample_path();
        let decoded = Path::from_json(&path.to_json().unwrap()).unwrap();
        assert_eq!(decoded, path);
    }

    #[test]
    fn test_node_count_mismatch_is_malformed() {
        let json = r#"{
            "destination": "Lab",
            "beacon_name": "pi",
            "node_count": 3,
            "nodes": {"index": [
                {"type": "start", "x_offset": 0.0, "y_offset": 0.0, "z_offset": -1.0},
                {"type": "destination", "x_offset": 1.0, "y_offset": 0.0, "z_offset": 0.0}
            ]}
        }"#;
        assert!(matches!(Path::from_json(json), Err(NavError::MalformedPath(_))));
    }

    #[test]
    fn test_unknown_type_is_malformed() {
        let json = r#"{
            "destination": "Lab",
            "beacon_name": "pi",
            "node_count": 2,
            "nodes": {"index": [
                {"type": "start", "x_offset": 0.0, "y_offset": 0.0, "z_offset": -1.0},
                {"type": "stairs", "x_offset": 1.0, "y_offset": 0.0, "z_offset": 0.0}
            ]}
        }"#;
        assert!(matches!(Path::from_json(json), Err(NavError::MalformedPath(_))));
    }

    #[test]
    fn test_empty_body_is_malformed() {
        assert!(matches!(
            Path::from_json_slice(b"  \n"),
            Err(NavError::MalformedPath(_))
        ));
    }

    #[test]
    fn test_path_list_decodes_as_vec() {
        let json = serde_json::to_string(&vec![sample_path(), sample_path().renamed("Lobby")])
            .unwrap();
        let paths: Vec<Path> = serde_json::from_str(&json).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[1].destination(), "Lobby");
    }
}
