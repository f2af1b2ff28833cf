//! World nodes: scene roots with render-phase participation.

use crate::{backend::RenderBackend, context::RenderContext, data_structures::model::ModelNode};

/// Root scene container.
///
/// Carries the same commit state as a model (held by composition, not
/// inheritance) and additionally brackets each frame with renderer-wide
/// setup and teardown. The render hooks run once per frame regardless of
/// scene-change state and are allocation-free.
#[derive(Debug, Default)]
pub struct WorldNode {
    pub model: ModelNode,
}

impl WorldNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn pre_render(&self, ctx: &mut RenderContext) {
        ctx.backend.begin_frame();
    }

    pub(crate) fn post_render(&self, ctx: &mut RenderContext) {
        ctx.backend.end_frame();
    }

    pub(crate) fn release(&mut self, backend: &mut dyn RenderBackend) {
        self.model.release(backend);
    }
}
