//! World-space axis-aligned bounding boxes.
//!
//! Viewers use the bounds of committed content for calibrating camera
//! motion and default camera placement. Nodes for which bounds do not apply
//! simply report [`Aabb::empty`].

use cgmath::{Matrix4, Vector3, Vector4};

/// Axis-aligned bounding box, `min`/`max` corner representation.
///
/// The empty box has `min > max` on every axis and is the identity of
/// [`Aabb::union`]; transforming it yields the empty box again.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// The empty box: contains nothing, unions to the other operand.
    pub fn empty() -> Self {
        Self {
            min: Vector3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Vector3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grow to contain `point`.
    pub fn extend(&mut self, point: Vector3<f32>) {
        self.min = Vector3::new(
            self.min.x.min(point.x),
            self.min.y.min(point.y),
            self.min.z.min(point.z),
        );
        self.max = Vector3::new(
            self.max.x.max(point.x),
            self.max.y.max(point.y),
            self.max.z.max(point.z),
        );
    }

    /// The smallest box containing both operands.
    pub fn union(&self, other: &Aabb) -> Aabb {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let mut out = *self;
        out.extend(other.min);
        out.extend(other.max);
        out
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// The box containing this box transformed by an affine matrix.
    ///
    /// All eight corners are transformed and re-wrapped, so the result is
    /// conservative for rotations (it bounds the rotated box, not the
    /// original content).
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        let mut out = Aabb::empty();
        for i in 0..8 {
            let corner = Vector4::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
                1.0,
            );
            let moved = matrix * corner;
            out.extend(Vector3::new(moved.x, moved.y, moved.z));
        }
        out
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Matrix4, Vector3};

    use super::Aabb;

    fn unit() -> Aabb {
        Aabb::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn empty_is_union_identity() {
        let b = unit();
        assert_eq!(Aabb::empty().union(&b), b);
        assert_eq!(b.union(&Aabb::empty()), b);
        assert!(Aabb::empty().union(&Aabb::empty()).is_empty());
    }

    #[test]
    fn union_contains_both() {
        let a = unit();
        let b = Aabb::new(Vector3::new(2.0, -1.0, 0.5), Vector3::new(3.0, 0.0, 2.0));
        let u = a.union(&b);
        assert_eq!(u.min, Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(u.max, Vector3::new(3.0, 1.0, 2.0));
    }

    #[test]
    fn transformed_by_translation_shifts_corners() {
        let moved = unit().transformed(&Matrix4::from_translation(Vector3::new(5.0, 0.0, -2.0)));
        assert_eq!(moved.min, Vector3::new(5.0, 0.0, -2.0));
        assert_eq!(moved.max, Vector3::new(6.0, 1.0, -1.0));
    }

    #[test]
    fn transformed_empty_stays_empty() {
        let moved = Aabb::empty().transformed(&Matrix4::from_scale(2.0));
        assert!(moved.is_empty());
    }
}
