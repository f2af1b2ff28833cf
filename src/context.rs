//! Per-pass state threaded through every lifecycle hook.

use crate::backend::RenderBackend;

/// Context handed by reference to every `pre_commit` / `post_commit` /
/// `pre_render` / `post_render` hook during a traversal pass.
///
/// It carries the active backend borrow plus frame-scoped bookkeeping. One
/// context is expected to live for exactly one pass; the `&mut` borrow it
/// holds is what prevents re-entrant commits by construction.
pub struct RenderContext<'a> {
    /// The native rendering library behind the handle seam.
    pub backend: &'a mut dyn RenderBackend,
    /// Frames rendered through this context so far.
    pub frame: u64,
}

impl<'a> RenderContext<'a> {
    pub fn new(backend: &'a mut dyn RenderBackend) -> Self {
        Self { backend, frame: 0 }
    }
}
