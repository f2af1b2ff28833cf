//! Instance nodes: a world placed at an affine transform.
//!
//! An instance caches two derived artifacts across commits: the composed
//! world-space transform (guarded by a dirty flag) and the native
//! instanced-geometry handle that wraps its world model for placement in a
//! parent scene. Both are resolved at commit time; render time only replays
//! cached handles.

use cgmath::{Matrix4, SquareMatrix};
use log::{debug, error, trace};

use crate::{
    backend::{InstanceHandle, ModelHandle, RenderBackend},
    context::RenderContext,
    data_structures::{transform::Transform, world::WorldNode},
    error::SceneError,
};

/// A world specialization that applies an affine transform to its subtree.
///
/// The composed transform is `base_transform * translation * rotation *
/// scale`. Mutating any of those marks the node dirty; a commit recomposes
/// and clears the flag. Identical writes do not re-dirty, so an unchanged
/// instance costs nothing to re-commit.
///
/// The native library does not support nested instancing. `instanced` can
/// be turned off to merge a subtree directly into the parent's model
/// instead of wrapping it; an instance parent likewise merges nested
/// instances at gather time, without touching the child's cached handle
/// (a node may be shared, and another parent may still wrap that handle).
#[derive(Debug)]
pub struct InstanceNode {
    pub world: WorldNode,
    instanced: bool,
    base_transform: Matrix4<f32>,
    transform: Transform,
    instance_dirty: bool,
    cached_transform: Matrix4<f32>,
    old_transform: Matrix4<f32>,
    instance: Option<InstanceHandle>,
    old_world_model: Option<ModelHandle>,
}

impl InstanceNode {
    pub fn new() -> Self {
        Self {
            world: WorldNode::new(),
            instanced: true,
            base_transform: Matrix4::identity(),
            transform: Transform::new(),
            instance_dirty: true,
            cached_transform: Matrix4::identity(),
            old_transform: Matrix4::identity(),
            instance: None,
            old_world_model: None,
        }
    }

    pub fn with_transform(transform: Transform) -> Self {
        let mut node = Self::new();
        node.transform = transform;
        node
    }

    pub fn instanced(&self) -> bool {
        self.instanced
    }

    /// Opt a subtree out of native instancing: its geometry is merged
    /// directly into the parent's model at the next commit.
    pub fn set_instanced(&mut self, instanced: bool) {
        self.instanced = instanced;
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn base_transform(&self) -> Matrix4<f32> {
        self.base_transform
    }

    /// The composed transform as of the last commit.
    pub fn cached_transform(&self) -> Matrix4<f32> {
        self.cached_transform
    }

    /// Whether transform state changed since the last commit.
    pub fn is_dirty(&self) -> bool {
        self.instance_dirty
    }

    /// The native instanced-geometry handle, if one is currently committed.
    pub fn instance(&self) -> Option<InstanceHandle> {
        self.instance
    }

    pub fn set_base_transform(&mut self, base: Matrix4<f32>) {
        if self.base_transform != base {
            self.base_transform = base;
            self.instance_dirty = true;
        }
    }

    pub fn set_position(&mut self, position: cgmath::Vector3<f32>) {
        if self.transform.position != position {
            self.transform.position = position;
            self.instance_dirty = true;
        }
    }

    pub fn set_rotation(&mut self, rotation: cgmath::Quaternion<f32>) {
        if self.transform.rotation != rotation {
            self.transform.rotation = rotation;
            self.instance_dirty = true;
        }
    }

    pub fn set_scale(&mut self, scale: cgmath::Vector3<f32>) {
        if self.transform.scale != scale {
            self.transform.scale = scale;
            self.instance_dirty = true;
        }
    }

    /// Recompose the cached transform if transform state changed.
    ///
    /// A non-invertible scale is reported and the last-good cached
    /// transform kept, so a bad edit cannot corrupt committed render state.
    pub(crate) fn update_transform(&mut self, name: &str) {
        if !self.instance_dirty {
            return;
        }
        self.instance_dirty = false;
        if !self.transform.is_invertible() {
            error!("instance {name}: non-invertible scale, keeping last-good transform");
            return;
        }
        self.cached_transform = self.base_transform * self.transform.to_matrix();
        trace!("instance {name}: recomposed transform");
    }

    /// Rebuild the native instanced-geometry handle if the composed
    /// transform or the underlying world model changed since the last
    /// commit. Returns `true` when a new handle was installed.
    pub(crate) fn update_instance(&mut self, ctx: &mut RenderContext, name: &str) -> Result<bool, SceneError> {
        let Some(model) = self.world.model.model() else {
            // Nothing committed to wrap; drop a stale handle if one exists.
            self.drop_instance(ctx.backend);
            return Ok(false);
        };
        if self.instance.is_some()
            && self.cached_transform == self.old_transform
            && self.old_world_model == Some(model)
        {
            trace!("instance {name}: unchanged, reusing handle {:?}", self.instance);
            return Ok(false);
        }

        let built = ctx.backend.create_instance(model, self.cached_transform)?;
        if let Some(old) = self.instance.take() {
            ctx.backend.release_instance(old);
        }
        debug!("instance {name}: rebuilt {built:?} around {model:?}");
        self.instance = Some(built);
        self.old_transform = self.cached_transform;
        self.old_world_model = Some(model);
        Ok(true)
    }

    /// Release the instanced-geometry handle, keeping the world model.
    /// Used when the subtree is merged into its parent instead of wrapped.
    pub(crate) fn drop_instance(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(instance) = self.instance.take() {
            backend.release_instance(instance);
            self.old_world_model = None;
        }
    }

    pub(crate) fn release(&mut self, backend: &mut dyn RenderBackend) {
        self.drop_instance(backend);
        self.world.release(backend);
    }
}

impl Default for InstanceNode {
    fn default() -> Self {
        Self::new()
    }
}
