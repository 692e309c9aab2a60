//! Route sources and map persistence.

pub mod local;
pub mod source;

pub use local::MapStore;
pub use source::{MapRepository, RouteSource};
