//! Scene data structures: nodes, transforms, bounds, and the graph itself.
//!
//! This module contains the core data types for scene representation:
//!
//! - `transform` holds the position / rotation / scale transform instances compose
//! - `bounds` contains the world-space axis-aligned bounding box
//! - `geometry` is the geometry-bearing leaf payload
//! - `model` is the geometry container backed by a native model handle
//! - `world` is the scene root with render-phase hooks
//! - `instance` places a world at an affine transform with commit-time caching
//! - `scene_graph` is the node arena and the commit/render traversal drivers

pub mod bounds;
pub mod geometry;
pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod transform;
pub mod world;
