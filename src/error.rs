//! Commit-time error taxonomy.
//!
//! Errors surface at commit time, never at render time: a failed commit
//! leaves the previously cached native handles intact so a bad scene edit
//! does not destroy a renderable state.

use thiserror::Error;

use crate::data_structures::scene_graph::NodeKey;

/// Errors raised while synchronizing the scene graph into the native renderer.
#[derive(Debug, Error)]
pub enum SceneError {
    /// A model rebuild was triggered with no geometry left to build from.
    #[error("cannot build a native model for `{node}`: no geometry")]
    EmptyModel { node: String },

    /// The native rendering library rejected a handle construction call.
    #[error("renderer rejected {what}: {reason}")]
    Backend { what: &'static str, reason: String },

    /// A key that is not (or no longer) part of this scene graph was passed
    /// to a traversal driver.
    #[error("node {0:?} is not part of this scene graph")]
    UnknownNode(NodeKey),

    /// A link that would make a node its own ancestor was rejected; the
    /// traversal drivers require an acyclic graph.
    #[error("linking {child:?} under {parent:?} would create a cycle")]
    CyclicLink { parent: NodeKey, child: NodeKey },
}
