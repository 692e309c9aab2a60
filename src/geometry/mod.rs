//! Geometry utilities: SE3 transforms, frame conventions, distances.

pub mod frames;
pub mod se3;

use nalgebra::Vector3;

pub use se3::{SE3, look_rotation};

/// Euclidean distance between two points: sqrt(dx² + dy² + dz²).
pub fn distance(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    (a - b).norm()
}
