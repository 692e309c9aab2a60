pub mod anchor;
pub mod authoring;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod layout;
pub mod model;
pub mod navigation;
pub mod relay;
pub mod store;
pub mod system;
#[cfg(feature = "viz")]
pub mod viz;
