//! Marker anchor pose as delivered by the marker-recognition pipeline.

use nalgebra::{Matrix4, Vector3};

use crate::geometry::SE3;

/// Pose of a scanned marker.
///
/// Produced by the recognition collaborator and only consumed here: the
/// engine reads its pose but never derives new anchors from it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorTransform {
    pose: SE3,
}

impl AnchorTransform {
    /// Wrap a 4x4 rigid transform reported for a detected marker.
    pub fn from_matrix(mat: Matrix4<f64>) -> Self {
        Self {
            pose: SE3::from_matrix(mat),
        }
    }

    pub fn from_pose(pose: SE3) -> Self {
        Self { pose }
    }

    pub fn pose(&self) -> &SE3 {
        &self.pose
    }

    pub fn position(&self) -> &Vector3<f64> {
        &self.pose.translation
    }

    pub fn to_matrix(&self) -> Matrix4<f64> {
        self.pose.to_matrix()
    }
}

impl From<SE3> for AnchorTransform {
    fn from(pose: SE3) -> Self {
        Self::from_pose(pose)
    }
}
