//! Path layout: waypoint chains to render nodes, edges and arrows.

pub mod builder;
pub mod render;

pub use builder::{DEFAULT_ARROW_HEIGHT, PathBuilder};
pub use render::{RenderArrow, RenderEdge, RenderNode, RenderSet};
