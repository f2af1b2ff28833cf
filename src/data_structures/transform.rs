//! Affine transform data for instanced sub-scenes.
//!
//! A [`Transform`] is the position / rotation / scale triple an instance
//! node composes (together with its caller-supplied base transform) into the
//! cached world-space matrix that places its sub-scene.

use std::ops::Mul;

use cgmath::{One, Zero};

/// Position, rotation (as quaternion) and non-uniform scale.
///
/// Composes right-to-left like a matrix product: `parent * local` applies
/// the local transform first, then the parent's.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Transform {
    /// The identity transform (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::zero(),
            // `Quaternion::one()` is the identity quaternion (no rotation)
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_position(position: cgmath::Vector3<f32>) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    /// The 4x4 affine matrix `translation * rotation * scale`.
    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Whether the transform has an inverse. A scale component at (or
    /// numerically indistinguishable from) zero collapses space and cannot
    /// be inverted; committing such a transform would corrupt cached render
    /// state, so callers keep the last-good value instead.
    pub fn is_invertible(&self) -> bool {
        const EPSILON: f32 = 1e-6;
        self.scale.x.abs() > EPSILON && self.scale.y.abs() > EPSILON && self.scale.z.abs() > EPSILON
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Mul<Transform> for Transform {
    type Output = Self;

    fn mul(self, rhs: Transform) -> Self::Output {
        &self * &rhs
    }
}

impl<'a, 'b> Mul<&'b Transform> for &'a Transform {
    type Output = Transform;

    fn mul(self, rhs: &'b Transform) -> Self::Output {
        let new_rotation = self.rotation * rhs.rotation;

        let new_scale = cgmath::Vector3::new(
            self.scale.x * rhs.scale.x,
            self.scale.y * rhs.scale.y,
            self.scale.z * rhs.scale.z,
        );
        let scaled_rhs_pos = cgmath::Vector3::new(
            self.scale.x * rhs.position.x,
            self.scale.y * rhs.position.y,
            self.scale.z * rhs.position.z,
        );
        let new_position = self.position + (self.rotation * scaled_rhs_pos);

        Transform {
            position: new_position,
            rotation: new_rotation,
            scale: new_scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use cgmath::{Deg, Matrix4, Quaternion, Rotation3, Vector3, Vector4};

    use super::Transform;

    #[test]
    fn identity_matrix_for_default() {
        let m = Transform::new().to_matrix();
        assert_relative_eq!(m, Matrix4::from_scale(1.0));
    }

    #[test]
    fn composition_matches_matrix_product() {
        let parent = Transform {
            position: Vector3::new(1.0, 2.0, 3.0),
            rotation: Quaternion::from_angle_y(Deg(90.0)),
            scale: Vector3::new(2.0, 2.0, 2.0),
        };
        let local = Transform::from_position(Vector3::new(0.5, 0.0, -1.0));

        let composed = (&parent * &local).to_matrix();
        let product = parent.to_matrix() * local.to_matrix();

        let p = Vector4::new(0.3, -0.7, 1.1, 1.0);
        assert_relative_eq!(composed * p, product * p, epsilon = 1e-5);
    }

    #[test]
    fn zero_scale_is_not_invertible() {
        let mut t = Transform::new();
        assert!(t.is_invertible());
        t.scale.y = 0.0;
        assert!(!t.is_invertible());
    }
}
