//! The seam to the external native rendering library.
//!
//! The scene graph never ray-traces anything itself. It owns opaque handles
//! produced by a [`RenderBackend`] and is responsible for exactly one
//! contract: every handle it creates is released before a replacement is
//! installed and before the owning node is destroyed.
//!
//! # Key types
//!
//! - [`RenderBackend`] is the trait the native library (or a test double)
//!   implements
//! - [`ModelHandle`] / [`InstanceHandle`] are the opaque native resources
//! - [`GeometryInput`] describes what a native model is built from

use cgmath::Matrix4;

use crate::{data_structures::scene_graph::NodeKey, error::SceneError};

/// Opaque handle to committed geometry ready for ray tracing.
///
/// Valid only after a successful commit. The node that created it owns it
/// exclusively and must release it through the backend that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModelHandle(pub u64);

/// Opaque handle to an instanced-geometry wrapper: one committed model
/// placed at a world-space transform inside a parent scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InstanceHandle(pub u64);

/// One contribution to a native model build.
///
/// A model is built from the geometry leaves directly under it plus the
/// instanced-geometry handles of its instance children. Inputs compare by
/// value; the commit pass uses that comparison to decide whether the cached
/// handle is still current.
#[derive(Clone, Debug, PartialEq)]
pub enum GeometryInput {
    /// A geometry leaf, pre-transformed into the parent's space. The
    /// revision counter changes whenever the leaf's data is mutated.
    Mesh {
        geometry: NodeKey,
        revision: u64,
        primitives: usize,
        transform: Matrix4<f32>,
    },
    /// An already-built instanced-geometry handle contributed by an
    /// instance child.
    Instance(InstanceHandle),
}

/// Operations the scene graph needs from the native rendering library.
///
/// Handle construction is synchronous and deterministic; no retries are
/// attempted on failure. The library manages its own internal threading for
/// traversal and shading, so none of these calls carry synchronization
/// obligations for the caller beyond the `&mut` receiver.
pub trait RenderBackend {
    /// Build a native model from the given geometry. Rejecting the
    /// parameters is a commit-time fault surfaced to the driver.
    fn create_model(&mut self, inputs: &[GeometryInput]) -> Result<ModelHandle, SceneError>;

    /// Release a model handle. Must be called exactly once per handle.
    fn release_model(&mut self, model: ModelHandle);

    /// Wrap a committed model at a world-space transform for placement in a
    /// parent scene.
    fn create_instance(
        &mut self,
        model: ModelHandle,
        transform: Matrix4<f32>,
    ) -> Result<InstanceHandle, SceneError>;

    /// Release an instanced-geometry handle. Must be called exactly once.
    fn release_instance(&mut self, instance: InstanceHandle);

    /// Acquire renderer-wide resources for one frame. Called once per frame
    /// regardless of scene-change state, so it must be cheap.
    fn begin_frame(&mut self);

    /// Submit a committed model for ray tracing this frame.
    fn render_model(&mut self, model: ModelHandle);

    /// Release per-frame resources acquired by [`RenderBackend::begin_frame`].
    fn end_frame(&mut self);
}
