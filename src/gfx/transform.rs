//! Local transforms for scene nodes.
//!
//! A node's world matrix is `parent_world * local.to_matrix()`; the local matrix is
//! translation, then rotation, then non-uniform scale.

use cgmath::{InnerSpace, Matrix4, One, Quaternion, Rad, Rotation3, Vector3};

/// Position, rotation (as quaternion) and scale of a node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    /// Identity transformation (no move, rotate, or scale).
    pub fn identity() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_position(x: f32, y: f32, z: f32) -> Self {
        Self::identity().with_position(x, y, z)
    }

    /// Builder pattern: Set position
    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vector3::new(x, y, z);
        self
    }

    /// Builder pattern: Set rotation from an axis and an angle in radians
    pub fn with_rotation(mut self, axis: Vector3<f32>, angle: f32) -> Self {
        self.rotation = axis_angle(axis, angle);
        self
    }

    /// Builder pattern: Set uniform scale
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vector3::new(scale, scale, scale);
        self
    }

    /// Builder pattern: Set non-uniform scale
    pub fn with_scale_xyz(mut self, x: f32, y: f32, z: f32) -> Self {
        self.scale = Vector3::new(x, y, z);
        self
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Layers a motion offset on top of this transform.
    ///
    /// Positions add, rotations compose (`self` first, then `delta`) and scales multiply
    /// component-wise. Offsets with identity rotation commute.
    pub fn offset_by(&self, delta: &Transform) -> Transform {
        Transform {
            position: self.position + delta.position,
            rotation: self.rotation * delta.rotation,
            scale: Vector3::new(
                self.scale.x * delta.scale.x,
                self.scale.y * delta.scale.y,
                self.scale.z * delta.scale.z,
            ),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Quaternion for `angle` radians about `axis`; a degenerate axis yields identity.
pub fn axis_angle(axis: Vector3<f32>, angle: f32) -> Quaternion<f32> {
    if axis.magnitude2() <= f32::EPSILON || !angle.is_finite() {
        return Quaternion::one();
    }
    Quaternion::from_axis_angle(axis.normalize(), Rad(angle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{SquareMatrix, Vector4};

    #[test]
    fn test_identity_matrix() {
        assert_eq!(Transform::identity().to_matrix(), Matrix4::identity());
    }

    #[test]
    fn test_offset_composes() {
        let base = Transform::from_position(1.0, 0.0, 0.0).with_scale(2.0);
        let delta = Transform::from_position(0.0, 0.5, 0.0).with_scale(1.5);
        let combined = base.offset_by(&delta);
        assert_eq!(combined.position, Vector3::new(1.0, 0.5, 0.0));
        assert_eq!(combined.scale, Vector3::new(3.0, 3.0, 3.0));
    }

    #[test]
    fn test_matrix_order() {
        // Scale applies before translation
        let t = Transform::from_position(0.0, 0.0, 5.0).with_scale(2.0);
        let p = t.to_matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!((p.x - 2.0).abs() < 1e-6);
        assert!((p.z - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_axis() {
        assert_eq!(axis_angle(Vector3::new(0.0, 0.0, 0.0), 1.0), Quaternion::one());
    }
}
