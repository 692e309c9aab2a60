//! Marker anchors and the per-session world-origin lock.

pub mod registry;
pub mod transform;

pub use registry::AnchorRegistry;
pub use transform::AnchorTransform;
