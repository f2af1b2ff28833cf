//! Geometry leaf payload.
//!
//! Geometry contents (vertex data, primitive topology) live with the native
//! rendering library; this layer only tracks what the commit pass needs:
//! local bounds, a primitive count, and a revision counter so parents can
//! tell whether their cached native handle went stale.

use crate::data_structures::bounds::Aabb;

/// A geometry-bearing leaf node.
#[derive(Clone, Debug)]
pub struct GeometryNode {
    bounds: Aabb,
    primitives: usize,
    revision: u64,
}

impl GeometryNode {
    pub fn new(bounds: Aabb, primitives: usize) -> Self {
        Self {
            bounds,
            primitives,
            revision: 0,
        }
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn primitives(&self) -> usize {
        self.primitives
    }

    /// Bumped on every mutation; included in the parent's gather snapshot.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_bounds(&mut self, bounds: Aabb) {
        self.bounds = bounds;
        self.revision += 1;
    }

    pub fn set_primitives(&mut self, primitives: usize) {
        self.primitives = primitives;
        self.revision += 1;
    }
}
