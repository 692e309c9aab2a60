//! Input replay.

pub mod walk_log;

pub use walk_log::{WalkEntry, WalkEvent, WalkLog};
