//! raygraph
//!
//! A scene-graph layer for ray-tracing renderers built around a two-phase
//! traversal: a commit pass synchronizes the scene description into opaque
//! native renderer handles, then a render pass replays the cached handles
//! once per frame. Commit-time work is proportional to what changed (dirty
//! flags and snapshot comparison short-circuit everything else); render-time
//! work is constant in scene complexity and allocation-free. Ray traversal,
//! shading and acceleration structures belong to the external native library
//! behind the [`backend::RenderBackend`] seam.
//!
//! High-level modules
//! - `backend`: the handle seam to the external native rendering library
//! - `context`: per-pass state threaded through every lifecycle hook
//! - `data_structures`: nodes (geometry, model, world, instance), transforms,
//!   bounds and the scene graph with its traversal drivers
//! - `error`: the commit-time error taxonomy
//!

pub mod backend;
pub mod context;
pub mod data_structures;
pub mod error;

// Re-exports commonly used types for convenience in downstream code.
pub use backend::{GeometryInput, InstanceHandle, ModelHandle, RenderBackend};
pub use context::RenderContext;
pub use data_structures::bounds::Aabb;
pub use data_structures::geometry::GeometryNode;
pub use data_structures::instance::InstanceNode;
pub use data_structures::model::ModelNode;
pub use data_structures::scene_graph::{
    NodeKey, NodeKind, SceneGraph, SceneNode, Serialization, SerializedNode,
};
pub use data_structures::transform::Transform;
pub use data_structures::world::WorldNode;
pub use error::SceneError;
pub use cgmath::*;
