//! Waypoint data model and its JSON wire contract.
//!
//! Pure value types: a [`Waypoint`] is an offset relative to its predecessor,
//! a [`Path`] is a named, well-formed sequence of them.

pub mod path;
pub mod waypoint;
pub mod wire;

pub use path::Path;
pub use waypoint::{Waypoint, WaypointKind};
pub use wire::PathWire;
