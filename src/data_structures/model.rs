//! Model nodes: geometry containers backed by a native model handle.
//!
//! A model caches its renders. Children are rendered during commit and the
//! cached native handle is replayed during the render call, so render-time
//! traversal never redoes commit-time work.

use log::{debug, trace};

use crate::{
    backend::{GeometryInput, ModelHandle, RenderBackend},
    context::RenderContext,
    error::SceneError,
};

/// Commit state for a geometry-bearing container node.
///
/// The native handle is rebuilt only when the gathered geometry inputs
/// differ from the previous-commit snapshot. A rebuild constructs the new
/// handle first and releases the old one only on success, so a failed
/// commit leaves the previously-good renderable state intact.
#[derive(Debug, Default)]
pub struct ModelNode {
    model: Option<ModelHandle>,
    old_model: Option<ModelHandle>,
    committed: Vec<GeometryInput>,
    num_geometry: usize,
}

impl ModelNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached native handle, if a commit has succeeded.
    pub fn model(&self) -> Option<ModelHandle> {
        self.model
    }

    /// Previous-commit snapshot of the handle. Equal to [`ModelNode::model`]
    /// after every successful commit; the pair only diverges mid-rebuild.
    pub fn old_model(&self) -> Option<ModelHandle> {
        self.old_model
    }

    /// Count of geometry inputs contributing to the current native handle.
    pub fn num_geometry(&self) -> usize {
        self.num_geometry
    }

    pub(crate) fn pre_commit(&mut self, _ctx: &mut RenderContext, name: &str) {
        trace!("pre_commit {name}");
    }

    /// Decide whether the native handle is stale and rebuild it if so.
    ///
    /// Returns `true` when a new handle was installed. `inputs` is the
    /// gather over the node's children at commit time; an unchanged gather
    /// reuses the cached handle with no backend call.
    pub(crate) fn post_commit(
        &mut self,
        ctx: &mut RenderContext,
        inputs: Vec<GeometryInput>,
        name: &str,
    ) -> Result<bool, SceneError> {
        if inputs == self.committed {
            self.old_model = self.model;
            trace!("post_commit {name}: unchanged, reusing handle {:?}", self.model);
            return Ok(false);
        }
        if inputs.is_empty() {
            return Err(SceneError::EmptyModel { node: name.into() });
        }

        // Build before releasing: a rejected build must not destroy the
        // previously committed handle.
        let built = ctx.backend.create_model(&inputs)?;
        if let Some(old) = self.model.take() {
            ctx.backend.release_model(old);
        }
        debug!(
            "post_commit {name}: rebuilt {built:?} from {} inputs",
            inputs.len()
        );
        self.model = Some(built);
        self.old_model = self.model;
        self.num_geometry = inputs.len();
        self.committed = inputs;
        Ok(true)
    }

    /// Release the native handle and forget the commit snapshot. Called when
    /// the owning node is destroyed.
    pub(crate) fn release(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(model) = self.model.take() {
            backend.release_model(model);
        }
        self.old_model = None;
        self.committed.clear();
        self.num_geometry = 0;
    }
}
