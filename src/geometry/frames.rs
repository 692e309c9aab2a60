//! Coordinate frame conventions for scene data and visualization.
//!
//! # Frame Conventions
//!
//! ## Scene Frame (RUB - AR session convention)
//! ```text
//!        +Y (up)
//!         |
//!         |
//!         +------ +X (right)
//!        /
//!       /
//!      +Z (backward, towards the viewer)
//! ```
//! Camera positions, marker anchors and every placed node live in this frame.
//! A camera looks down its local -Z axis, and so do arrow nodes.
//!
//! ## Visualization Frame (RFU - Rerun convention)
//! ```text
//!        +Z (up)
//!         |
//!         |   +Y (forward)
//!         |  /
//!         | /
//!         +------ +X (right)
//! ```
//! This is what the visualizer declares with `ViewCoordinates::RFU()`.
//!
//! # Transformation Naming Convention
//!
//! `rotation_target_source` maps a vector from `source` into `target`:
//! ```text
//! p_viz = rotation_viz_scene() * p_scene
//! ```

use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};

use super::SE3;

/// Fixed rotation from the scene frame (RUB) to the visualization frame (RFU).
///
/// Maps:
/// - Scene +X (right)    → Viz +X (right)
/// - Scene -Z (forward)  → Viz +Y (forward)
/// - Scene +Y (up)       → Viz +Z (up)
#[rustfmt::skip]
pub fn rotation_viz_scene() -> Matrix3<f64> {
    Matrix3::new(
        1.0, 0.0,  0.0,  // Viz X = Scene X
        0.0, 0.0, -1.0,  // Viz Y = -Scene Z
        0.0, 1.0,  0.0,  // Viz Z = Scene Y
    )
}

/// Fixed rotation from the visualization frame (RFU) back to the scene frame (RUB).
pub fn rotation_scene_viz() -> Matrix3<f64> {
    rotation_viz_scene().transpose()
}

/// Transform a scene-frame position into the visualization frame.
pub fn scene_position_to_viz(p_scene: &Vector3<f64>) -> Vector3<f64> {
    rotation_viz_scene() * p_scene
}

/// Transform a visualization-frame position back into the scene frame.
pub fn viz_position_to_scene(p_viz: &Vector3<f64>) -> Vector3<f64> {
    rotation_scene_viz() * p_viz
}

/// Transform a scene-frame pose into the visualization frame.
///
/// R_viz = R_viz_scene * R * R_scene_viz, so a node's local axes keep their
/// meaning after conversion.
pub fn scene_pose_to_viz(pose: &SE3) -> SE3 {
    let r_viz_scene = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(
        rotation_viz_scene(),
    ));
    let r_scene_viz = r_viz_scene.inverse();

    SE3 {
        rotation: r_viz_scene * pose.rotation * r_scene_viz,
        translation: scene_position_to_viz(&pose.translation),
    }
}
