//! Waypoint: one node of a navigation path.

use std::fmt;
use std::str::FromStr;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::NavError;

/// Role of a waypoint inside its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaypointKind {
    /// First node, placed relative to the anchor.
    Start,
    /// Any node between start and destination.
    Intermediate,
    /// Last node; arrival is measured against it.
    Destination,
}

impl WaypointKind {
    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Intermediate => "intermediate",
            Self::Destination => "destination",
        }
    }
}

impl fmt::Display for WaypointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WaypointKind {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "intermediate" => Ok(Self::Intermediate),
            "destination" => Ok(Self::Destination),
            other => Err(NavError::MalformedPath(format!(
                "unrecognized waypoint type `{other}`"
            ))),
        }
    }
}

/// A single waypoint.
///
/// `offset` is a translation relative to the previous waypoint in the path
/// (the anchor, for the start waypoint), never an absolute position.
/// Waypoints are immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    kind: WaypointKind,
    offset: Vector3<f64>,
}

impl Waypoint {
    pub fn new(kind: WaypointKind, offset: Vector3<f64>) -> Self {
        Self { kind, offset }
    }

    /// Parse the kind from its wire name.
    pub fn from_parts(kind: &str, x: f64, y: f64, z: f64) -> Result<Self, NavError> {
        Ok(Self::new(kind.parse()?, Vector3::new(x, y, z)))
    }

    pub fn start(offset: Vector3<f64>) -> Self {
        Self::new(WaypointKind::Start, offset)
    }

    pub fn intermediate(offset: Vector3<f64>) -> Self {
        Self::new(WaypointKind::Intermediate, offset)
    }

    pub fn destination(offset: Vector3<f64>) -> Self {
        Self::new(WaypointKind::Destination, offset)
    }

    pub fn kind(&self) -> WaypointKind {
        self.kind
    }

    pub fn offset(&self) -> &Vector3<f64> {
        &self.offset
    }
}
