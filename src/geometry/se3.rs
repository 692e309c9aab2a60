//! SE3: 6-DOF rigid transformation (rotation + translation).
//!
//! Scene nodes, marker anchors and camera poses are all expressed as `SE3`.
//! Placement of a waypoint is a right-composition `parent * translation(offset)`,
//! so an offset is interpreted in the parent's local frame.

use nalgebra::{Matrix4, Rotation3, Unit, UnitQuaternion, Vector3};

/// Below this length a direction vector is treated as degenerate.
const MIN_DIRECTION_NORM: f64 = 1e-9;

/// Rigid transformation: p' = R * p + t.
#[derive(Debug, Clone, PartialEq)]
pub struct SE3 {
    pub rotation: UnitQuaternion<f64>,
    pub translation: Vector3<f64>,
}

impl SE3 {
    /// Identity transformation.
    pub fn identity() -> Self {
        Self {
            rotation: UnitQuaternion::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Pure translation with no rotation.
    pub fn from_translation(translation: Vector3<f64>) -> Self {
        Self {
            rotation: UnitQuaternion::identity(),
            translation,
        }
    }

    /// Construct from quaternion (w, x, y, z) and translation.
    pub fn from_quaternion(qw: f64, qx: f64, qy: f64, qz: f64, translation: Vector3<f64>) -> Self {
        let rotation =
            UnitQuaternion::from_quaternion(nalgebra::Quaternion::new(qw, qx, qy, qz));
        Self {
            rotation,
            translation,
        }
    }

    /// Construct from a homogeneous 4x4 matrix of form [R | t; 0 | 1].
    ///
    /// The rotation block is assumed orthonormal (it comes from a tracking
    /// pipeline, not from user input).
    pub fn from_matrix(mat: Matrix4<f64>) -> Self {
        let r_block = mat.fixed_view::<3, 3>(0, 0).into_owned();
        let translation = Vector3::new(mat[(0, 3)], mat[(1, 3)], mat[(2, 3)]);
        let rot3 = Rotation3::from_matrix_unchecked(r_block);
        Self {
            rotation: UnitQuaternion::from_rotation_matrix(&rot3),
            translation,
        }
    }

    /// Convert to homogeneous 4x4 matrix.
    pub fn to_matrix(&self) -> Matrix4<f64> {
        let mut mat = Matrix4::identity();
        let r = self.rotation.to_rotation_matrix().into_inner();
        mat.fixed_view_mut::<3, 3>(0, 0).copy_from(&r);
        mat[(0, 3)] = self.translation.x;
        mat[(1, 3)] = self.translation.y;
        mat[(2, 3)] = self.translation.z;
        mat
    }

    /// Inverse transformation: [R^T | -R^T t].
    pub fn inverse(&self) -> Self {
        let rot_inv = self.rotation.inverse();
        Self {
            translation: -(rot_inv * self.translation),
            rotation: rot_inv,
        }
    }

    /// Compose two transforms: self ∘ other.
    ///
    /// [R1 | t1] ∘ [R2 | t2] = [R1 R2 | R1 t2 + t1]
    pub fn compose(&self, other: &SE3) -> Self {
        Self {
            rotation: self.rotation * other.rotation,
            translation: self.rotation * other.translation + self.translation,
        }
    }

    /// Right-compose a pure translation expressed in this transform's local frame.
    pub fn translated_local(&self, offset: &Vector3<f64>) -> Self {
        self.compose(&SE3::from_translation(*offset))
    }

    /// Transform a single point: p' = R * p + t.
    pub fn transform_point(&self, p: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * p + self.translation
    }

    /// Euclidean distance between the origins of two transforms.
    pub fn distance_to(&self, other: &SE3) -> f64 {
        (self.translation - other.translation).norm()
    }
}

impl Default for SE3 {
    fn default() -> Self {
        Self::identity()
    }
}

/// Rotation that turns the local -Z axis ("forward" for scene nodes) towards `direction`.
///
/// Returns `None` when `direction` is degenerate (zero length).
pub fn look_rotation(direction: &Vector3<f64>) -> Option<UnitQuaternion<f64>> {
    if direction.norm() < MIN_DIRECTION_NORM {
        return None;
    }
    let forward = -Vector3::z();
    let target = direction.normalize();
    // rotation_between is undefined for exactly opposite vectors
    UnitQuaternion::rotation_between(&forward, &target).or_else(|| {
        Some(UnitQuaternion::from_axis_angle(
            &Unit::new_normalize(Vector3::y()),
            std::f64::consts::PI,
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity() {
        let se3 = SE3::identity();
        let p = Vector3::new(1.0, 2.0, 3.0);
        assert_relative_eq!(se3.transform_point(&p), p, epsilon = 1e-12);
    }

    #[test]
    fn test_inverse() {
        let se3 = SE3 {
            rotation: UnitQuaternion::from_axis_angle(
                &Unit::new_normalize(Vector3::new(0.0, 0.0, 1.0)),
                std::f64::consts::FRAC_PI_2,
            ),
            translation: Vector3::new(1.0, 2.0, 3.0),
        };

        let composed = se3.compose(&se3.inverse());
        assert_relative_eq!(composed.translation.norm(), 0.0, epsilon = 1e-10);
        assert_relative_eq!(composed.rotation.angle(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_translated_local_follows_parent_rotation() {
        // Parent rotated 90° about Y: local +X maps to world -Z.
        let parent = SE3 {
            rotation: UnitQuaternion::from_axis_angle(
                &Unit::new_normalize(Vector3::y()),
                std::f64::consts::FRAC_PI_2,
            ),
            translation: Vector3::new(1.0, 0.0, 0.0),
        };

        let child = parent.translated_local(&Vector3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(child.translation, Vector3::new(1.0, 0.0, -2.0), epsilon = 1e-10);
        assert_relative_eq!(child.rotation.coords, parent.rotation.coords, epsilon = 1e-12);
    }

    #[test]
    fn test_to_from_matrix() {
        let se3 = SE3 {
            rotation: UnitQuaternion::from_axis_angle(
                &Unit::new_normalize(Vector3::new(1.0, 0.0, 0.0)),
                std::f64::consts::FRAC_PI_4,
            ),
            translation: Vector3::new(1.0, 2.0, 3.0),
        };

        let reconstructed = SE3::from_matrix(se3.to_matrix());
        assert_relative_eq!(se3.translation, reconstructed.translation, epsilon = 1e-10);
        assert_relative_eq!(se3.rotation.coords, reconstructed.rotation.coords, epsilon = 1e-10);
    }

    #[test]
    fn test_look_rotation_points_forward_axis() {
        let dir = Vector3::new(1.0, 0.0, 0.0);
        let rot = look_rotation(&dir).expect("non-degenerate direction");
        let forward = rot * -Vector3::z();
        assert_relative_eq!(forward, dir, epsilon = 1e-10);
    }

    #[test]
    fn test_look_rotation_opposite_and_degenerate() {
        let rot = look_rotation(&Vector3::new(0.0, 0.0, 3.0)).expect("opposite is handled");
        assert_relative_eq!(rot * -Vector3::z(), Vector3::z(), epsilon = 1e-10);

        assert!(look_rotation(&Vector3::zeros()).is_none());
    }
}
