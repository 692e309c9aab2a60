//! Path: a named, ordered sequence of waypoints anchored to one beacon.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::NavError;

use super::waypoint::{Waypoint, WaypointKind};
use super::wire::PathWire;

/// A well-formed navigation path.
///
/// Insertion order is traversal order is rendering order. A path always holds
/// at least one waypoint; the first is the start and, once there are two or
/// more, the last is the destination with intermediates in between.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PathWire", into = "PathWire")]
pub struct Path {
    destination: String,
    beacon_name: String,
    waypoints: Vec<Waypoint>,
}

impl Path {
    /// Build a path, rejecting waypoint sequences that are not well formed.
    pub fn new(
        destination: impl Into<String>,
        beacon_name: impl Into<String>,
        waypoints: Vec<Waypoint>,
    ) -> Result<Self, NavError> {
        validate_sequence(&waypoints)?;
        Ok(Self {
            destination: destination.into(),
            beacon_name: beacon_name.into(),
            waypoints,
        })
    }

    /// Build a path from bare offsets, assigning kinds by position.
    pub fn from_offsets(
        destination: impl Into<String>,
        beacon_name: impl Into<String>,
        offsets: &[Vector3<f64>],
    ) -> Result<Self, NavError> {
        let last = offsets.len().saturating_sub(1);
        let waypoints = offsets
            .iter()
            .enumerate()
            .map(|(i, offset)| {
                let kind = if i == 0 {
                    WaypointKind::Start
                } else if i == last {
                    WaypointKind::Destination
                } else {
                    WaypointKind::Intermediate
                };
                Waypoint::new(kind, *offset)
            })
            .collect();
        Self::new(destination, beacon_name, waypoints)
    }

    /// Unique key used for save, search and delete.
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Marker that must be scanned to anchor this path.
    pub fn beacon_name(&self) -> &str {
        &self.beacon_name
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// True when the path leads somewhere (start plus destination at least).
    pub fn is_navigable(&self) -> bool {
        self.waypoints.len() >= 2
    }

    /// Same path under another destination name.
    pub fn renamed(&self, destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            ..self.clone()
        }
    }

    pub(crate) fn into_parts(self) -> (String, String, Vec<Waypoint>) {
        (self.destination, self.beacon_name, self.waypoints)
    }
}

/// Check the start / intermediate / destination structure of a waypoint list.
pub fn validate_sequence(waypoints: &[Waypoint]) -> Result<(), NavError> {
    let Some(first) = waypoints.first() else {
        return Err(NavError::MalformedPath("path has no waypoints".to_string()));
    };
    if first.kind() != WaypointKind::Start {
        return Err(NavError::MalformedPath(format!(
            "first waypoint must be start, found {}",
            first.kind()
        )));
    }

    let last_idx = waypoints.len() - 1;
    for (i, wp) in waypoints.iter().enumerate().skip(1) {
        let expected = if i == last_idx {
            WaypointKind::Destination
        } else {
            WaypointKind::Intermediate
        };
        if wp.kind() != expected {
            return Err(NavError::MalformedPath(format!(
                "waypoint {i} must be {expected}, found {}",
                wp.kind()
            )));
        }
    }
    Ok(())
}
