//! Optional visualization (feature `viz`).

pub mod rerun;

pub use self::rerun::RerunVisualizer;
