//! Session events.
//!
//! Sessions publish these on a bounded channel so the UI layer can react to
//! state changes without holding a reference to the session.

use nalgebra::Vector3;

use crate::error::ErrorKind;
use crate::model::WaypointKind;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A marker scan became the world origin.
    AnchorLocked {
        /// Marker identity, when the recognizer reported one.
        beacon: Option<String>,
    },

    /// A waypoint was appended while authoring.
    WaypointAdded {
        index: usize,
        kind: WaypointKind,
        /// Absolute position of the new render node.
        position: Vector3<f64>,
    },

    /// The most recent waypoint was undone.
    WaypointRemoved { index: usize },

    /// An authored path was finalized.
    PathSaved {
        destination: String,
        waypoints: usize,
    },

    /// A fetched route was laid out and navigation started.
    RouteLaidOut { destination: String, nodes: usize },

    /// The camera came within the arrival threshold of the last node.
    Arrived { destination: String, distance: f64 },

    /// Navigation was cancelled before arrival.
    Cancelled,

    /// An operation was rejected.
    Error(ErrorKind),
}
