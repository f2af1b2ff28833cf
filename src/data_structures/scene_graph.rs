//! Scene graph and the commit/render traversal drivers.
//!
//! The graph is an arena of nodes with stable keys. Parents link to
//! children by key and children may be shared (the same committed sub-scene
//! reused by several instances); explicit reference counting decides when a
//! node becomes unreachable and its native handles are released.
//!
//! Control flows top-down in a fixed phase order driven by the caller:
//! one [`SceneGraph::commit`] pass per scene change, then one
//! [`SceneGraph::render`] pass per frame. Commit synchronizes the scene
//! description into native renderer handles, bottom-up, short-circuiting
//! wherever cached state is still current. Render only replays the cached
//! root handle, so its cost is independent of scene complexity.

use cgmath::{Matrix4, SquareMatrix};
use log::{debug, warn};
use slotmap::{SlotMap, new_key_type};

use crate::{
    backend::{GeometryInput, RenderBackend},
    context::RenderContext,
    data_structures::{
        bounds::Aabb, geometry::GeometryNode, instance::InstanceNode, model::ModelNode,
        world::WorldNode,
    },
    error::SceneError,
};

new_key_type! {
    /// Stable key of a node in the arena. Keys survive unrelated removals
    /// and are never reused for a different node.
    pub struct NodeKey;
}

/// The node-kind tag. Lifecycle hooks dispatch through an explicit match
/// over this tag rather than through a base-class vtable.
#[derive(Debug)]
pub enum NodeKind {
    /// Geometry-bearing leaf.
    Geometry(GeometryNode),
    /// Geometry container backed by a native model handle.
    Model(ModelNode),
    /// Scene root: a model container with render-phase hooks.
    World(WorldNode),
    /// A world placed at an affine transform.
    Instance(InstanceNode),
}

/// One arena slot: a named node, its child edges, and its kind state.
#[derive(Debug)]
pub struct SceneNode {
    pub name: String,
    children: Vec<NodeKey>,
    refs: usize,
    pub kind: NodeKind,
}

impl SceneNode {
    /// Human-readable kind name.
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            NodeKind::Geometry(_) => "Geometry",
            NodeKind::Model(_) => "Model",
            NodeKind::World(_) => "World",
            NodeKind::Instance(_) => "Instance",
        }
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// How many parents currently link to this node.
    pub fn refs(&self) -> usize {
        self.refs
    }
}

/// A node flattened out of the tree for an external viewer.
#[derive(Clone, Debug)]
pub struct SerializedNode {
    pub key: NodeKey,
    pub type_name: &'static str,
    pub name: String,
    pub world_transform: Matrix4<f32>,
}

/// Flat serialization state filled by [`SceneGraph::serialize`]. The
/// persistence format on top of it is an external collaborator.
#[derive(Debug, Default)]
pub struct Serialization {
    pub items: Vec<SerializedNode>,
}

/// Arena of scene nodes plus the traversal drivers.
///
/// Traversal is single-threaded and cooperative: hooks run sequentially in
/// phase order and never assume concurrent invocation. Native handles
/// require the backend to release, so dropping the graph without calling
/// [`SceneGraph::release`] (or removing the nodes) leaks them.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeKey, SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_geometry(&mut self, name: impl Into<String>, geometry: GeometryNode) -> NodeKey {
        self.insert(name.into(), NodeKind::Geometry(geometry))
    }

    pub fn add_model(&mut self, name: impl Into<String>) -> NodeKey {
        self.insert(name.into(), NodeKind::Model(ModelNode::new()))
    }

    pub fn add_world(&mut self, name: impl Into<String>) -> NodeKey {
        self.insert(name.into(), NodeKind::World(WorldNode::new()))
    }

    pub fn add_instance(&mut self, name: impl Into<String>, instance: InstanceNode) -> NodeKey {
        self.insert(name.into(), NodeKind::Instance(instance))
    }

    fn insert(&mut self, name: String, kind: NodeKind) -> NodeKey {
        self.nodes.insert(SceneNode {
            name,
            children: Vec::new(),
            refs: 0,
            kind,
        })
    }

    /// Link `child` under `parent`. A node may be linked under several
    /// parents; each link holds one reference. The graph stays acyclic:
    /// a link that would make a node its own ancestor is rejected, which
    /// keeps every traversal finite.
    pub fn add_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), SceneError> {
        if !self.nodes.contains_key(child) {
            return Err(SceneError::UnknownNode(child));
        }
        if parent == child || self.links_to(child, parent) {
            return Err(SceneError::CyclicLink { parent, child });
        }
        let parent_node = self
            .nodes
            .get_mut(parent)
            .ok_or(SceneError::UnknownNode(parent))?;
        parent_node.children.push(child);
        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.refs += 1;
        }
        Ok(())
    }

    /// Unlink `child` from `parent`. When the last link to a node goes
    /// away the node is destroyed: its native handles are released through
    /// `backend` and its own children are unlinked in turn.
    pub fn remove_child(
        &mut self,
        parent: NodeKey,
        child: NodeKey,
        backend: &mut dyn RenderBackend,
    ) -> Result<(), SceneError> {
        let parent_node = self
            .nodes
            .get_mut(parent)
            .ok_or(SceneError::UnknownNode(parent))?;
        let Some(position) = parent_node.children.iter().position(|&key| key == child) else {
            warn!("remove_child: {child:?} is not a child of {parent:?}");
            return Ok(());
        };
        parent_node.children.remove(position);
        self.unref(child, backend);
        Ok(())
    }

    /// Remove an unparented (root) node, releasing its handles and
    /// unlinking its subtree. Nodes still linked under a parent are left in
    /// place; remove the edge instead.
    pub fn remove(&mut self, key: NodeKey, backend: &mut dyn RenderBackend) {
        match self.nodes.get(key) {
            None => {}
            Some(node) if node.refs > 0 => {
                warn!(
                    "remove: {} ({key:?}) still has {} parent link(s), not removing",
                    node.name, node.refs
                );
            }
            Some(_) => self.destroy(key, backend),
        }
    }

    /// Release every native handle in the arena. The shutdown path before
    /// dropping the graph.
    pub fn release(&mut self, backend: &mut dyn RenderBackend) {
        for (_, node) in self.nodes.iter_mut() {
            match &mut node.kind {
                NodeKind::Geometry(_) => {}
                NodeKind::Model(model) => model.release(backend),
                NodeKind::World(world) => world.release(backend),
                NodeKind::Instance(instance) => instance.release(backend),
            }
        }
    }

    /// Whether `target` is reachable from `from` through child edges.
    fn links_to(&self, from: NodeKey, target: NodeKey) -> bool {
        let Some(node) = self.nodes.get(from) else {
            return false;
        };
        node.children
            .iter()
            .any(|&child| child == target || self.links_to(child, target))
    }

    fn unref(&mut self, key: NodeKey, backend: &mut dyn RenderBackend) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        node.refs = node.refs.saturating_sub(1);
        if node.refs == 0 {
            self.destroy(key, backend);
        }
    }

    fn destroy(&mut self, key: NodeKey, backend: &mut dyn RenderBackend) {
        let Some(mut node) = self.nodes.remove(key) else {
            return;
        };
        match &mut node.kind {
            NodeKind::Geometry(_) => {}
            NodeKind::Model(model) => model.release(backend),
            NodeKind::World(world) => world.release(backend),
            NodeKind::Instance(instance) => instance.release(backend),
        }
        for child in node.children {
            self.unref(child, backend);
        }
    }

    pub fn node(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut SceneNode> {
        self.nodes.get_mut(key)
    }

    pub fn geometry(&self, key: NodeKey) -> Option<&GeometryNode> {
        match &self.nodes.get(key)?.kind {
            NodeKind::Geometry(geometry) => Some(geometry),
            _ => None,
        }
    }

    pub fn geometry_mut(&mut self, key: NodeKey) -> Option<&mut GeometryNode> {
        match &mut self.nodes.get_mut(key)?.kind {
            NodeKind::Geometry(geometry) => Some(geometry),
            _ => None,
        }
    }

    pub fn model(&self, key: NodeKey) -> Option<&ModelNode> {
        match &self.nodes.get(key)?.kind {
            NodeKind::Model(model) => Some(model),
            _ => None,
        }
    }

    pub fn world(&self, key: NodeKey) -> Option<&WorldNode> {
        match &self.nodes.get(key)?.kind {
            NodeKind::World(world) => Some(world),
            _ => None,
        }
    }

    pub fn instance(&self, key: NodeKey) -> Option<&InstanceNode> {
        match &self.nodes.get(key)?.kind {
            NodeKind::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn instance_mut(&mut self, key: NodeKey) -> Option<&mut InstanceNode> {
        match &mut self.nodes.get_mut(key)?.kind {
            NodeKind::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    /// One commit pass: synchronize the subtree under `root` into native
    /// renderer handles. `pre_commit` runs top-down, handles are built
    /// bottom-up in `post_commit`, and unchanged nodes reuse their cached
    /// handles without touching the backend. On error the pass stops and
    /// every previously committed handle is left intact.
    pub fn commit(&mut self, root: NodeKey, ctx: &mut RenderContext) -> Result<(), SceneError> {
        self.commit_node(root, ctx)
    }

    fn commit_node(&mut self, key: NodeKey, ctx: &mut RenderContext) -> Result<(), SceneError> {
        let node = self
            .nodes
            .get_mut(key)
            .ok_or(SceneError::UnknownNode(key))?;
        let is_instance = matches!(node.kind, NodeKind::Instance(_));
        let is_geometry = matches!(node.kind, NodeKind::Geometry(_));
        {
            let SceneNode { name, kind, .. } = node;
            match kind {
                NodeKind::Geometry(_) => {}
                NodeKind::Model(model) => model.pre_commit(ctx, name),
                NodeKind::World(world) => world.model.pre_commit(ctx, name),
                NodeKind::Instance(instance) => instance.world.model.pre_commit(ctx, name),
            }
        }

        let children = node.children.clone();
        for child in children {
            self.commit_node(child, ctx)?;
        }

        if is_geometry {
            return Ok(());
        }
        let inputs = self.gather_inputs(key, is_instance)?;

        let node = self
            .nodes
            .get_mut(key)
            .ok_or(SceneError::UnknownNode(key))?;
        let SceneNode { name, kind, .. } = node;
        match kind {
            NodeKind::Geometry(_) => {}
            NodeKind::Model(model) => {
                model.post_commit(ctx, inputs, name)?;
            }
            NodeKind::World(world) => {
                world.model.post_commit(ctx, inputs, name)?;
            }
            NodeKind::Instance(instance) => {
                instance.world.model.post_commit(ctx, inputs, name)?;
                instance.update_transform(name);
                if instance.instanced() {
                    // Whether a parent wraps this handle or merges the
                    // subtree is decided per edge at gather time; a shared
                    // node may have parents doing both, so the handle must
                    // stay alive as long as instancing is on.
                    instance.update_instance(ctx, name)?;
                } else {
                    // Opted out: merged into the parent's model, no native
                    // instanced geometry for this node.
                    instance.drop_instance(ctx.backend);
                }
            }
        }
        Ok(())
    }

    /// Collect the geometry inputs of `parent`'s native model: its direct
    /// geometry leaves, the instanced-geometry handles of its instance
    /// children, and the pre-transformed geometry of merged subtrees.
    /// Structural (model/world) children own their geometry and contribute
    /// nothing; placement requires an instance.
    fn gather_inputs(
        &self,
        parent: NodeKey,
        merge_instances: bool,
    ) -> Result<Vec<GeometryInput>, SceneError> {
        let node = self
            .nodes
            .get(parent)
            .ok_or(SceneError::UnknownNode(parent))?;
        let mut inputs = Vec::new();
        for &child in &node.children {
            self.gather_child(child, Matrix4::identity(), merge_instances, &mut inputs)?;
        }
        Ok(inputs)
    }

    fn gather_child(
        &self,
        key: NodeKey,
        transform: Matrix4<f32>,
        merge_instances: bool,
        inputs: &mut Vec<GeometryInput>,
    ) -> Result<(), SceneError> {
        let node = self.nodes.get(key).ok_or(SceneError::UnknownNode(key))?;
        match &node.kind {
            NodeKind::Geometry(geometry) => {
                inputs.push(GeometryInput::Mesh {
                    geometry: key,
                    revision: geometry.revision(),
                    primitives: geometry.primitives(),
                    transform,
                });
            }
            NodeKind::Instance(instance) => {
                if instance.instanced() && !merge_instances {
                    if let Some(handle) = instance.instance() {
                        inputs.push(GeometryInput::Instance(handle));
                    }
                } else {
                    // Merge the subtree directly, composing transforms.
                    // Everything below a merge point stays merged.
                    let composed = transform * instance.cached_transform();
                    for &child in &node.children {
                        self.gather_child(child, composed, true, inputs)?;
                    }
                }
            }
            NodeKind::Model(_) | NodeKind::World(_) => {}
        }
        Ok(())
    }

    /// One frame: `pre_render`, replay of the cached root handle,
    /// `post_render`. No transform work, no handle construction and no heap
    /// allocation happen here; everything was resolved at commit time.
    pub fn render(&self, root: NodeKey, ctx: &mut RenderContext) -> Result<(), SceneError> {
        let node = self.nodes.get(root).ok_or(SceneError::UnknownNode(root))?;
        ctx.frame += 1;
        match &node.kind {
            NodeKind::World(world) => {
                world.pre_render(ctx);
                Self::replay(&world.model, ctx, &node.name);
                world.post_render(ctx);
            }
            NodeKind::Instance(instance) => {
                // Render hooks delegate to the world; the transform was
                // folded into the committed handles.
                instance.world.pre_render(ctx);
                Self::replay(&instance.world.model, ctx, &node.name);
                instance.world.post_render(ctx);
            }
            // Model has no render hooks; it only replays.
            NodeKind::Model(model) => Self::replay(model, ctx, &node.name),
            NodeKind::Geometry(_) => {
                warn!("render: {} is a geometry leaf, nothing to replay", node.name);
            }
        }
        Ok(())
    }

    fn replay(model: &ModelNode, ctx: &mut RenderContext, name: &str) {
        match model.model() {
            Some(handle) => ctx.backend.render_model(handle),
            None => warn!("render: {name} has no committed model, skipping"),
        }
    }

    /// String-keyed traversal dispatch. `"commit"` and `"render"` run the
    /// corresponding passes; any other operation is a free extension point
    /// and descends the subtree without side effects.
    pub fn traverse(
        &mut self,
        root: NodeKey,
        ctx: &mut RenderContext,
        operation: &str,
    ) -> Result<(), SceneError> {
        match operation {
            "commit" => self.commit(root, ctx),
            "render" => self.render(root, ctx),
            other => {
                debug!("traverse: no handler for operation {other:?}");
                self.visit(root)
            }
        }
    }

    fn visit(&self, key: NodeKey) -> Result<(), SceneError> {
        let node = self.nodes.get(key).ok_or(SceneError::UnknownNode(key))?;
        for &child in &node.children {
            self.visit(child)?;
        }
        Ok(())
    }

    /// Bounding box of the committed content under `key`, in the parent's
    /// coordinate space: a geometry leaf reports its own box, containers
    /// the union over their children, and an instance its world's box
    /// transformed by the cached transform. Unknown keys and childless
    /// containers report the empty box.
    pub fn compute_bounds(&self, key: NodeKey) -> Aabb {
        let Some(node) = self.nodes.get(key) else {
            return Aabb::empty();
        };
        match &node.kind {
            NodeKind::Geometry(geometry) => geometry.bounds(),
            NodeKind::Model(_) | NodeKind::World(_) => self.children_bounds(node),
            NodeKind::Instance(instance) => self
                .children_bounds(node)
                .transformed(&instance.cached_transform()),
        }
    }

    fn children_bounds(&self, node: &SceneNode) -> Aabb {
        node.children
            .iter()
            .fold(Aabb::empty(), |bounds, &child| {
                bounds.union(&self.compute_bounds(child))
            })
    }

    /// Flatten the subtree under `root` into `state`, composing instance
    /// transforms into per-node world transforms. An instance's own row
    /// already carries its composed placement; its children inherit it.
    pub fn serialize(&self, root: NodeKey, state: &mut Serialization) {
        self.serialize_node(root, Matrix4::identity(), state);
    }

    fn serialize_node(&self, key: NodeKey, parent_world: Matrix4<f32>, state: &mut Serialization) {
        let Some(node) = self.nodes.get(key) else {
            return;
        };
        let world = match &node.kind {
            NodeKind::Instance(instance) => parent_world * instance.cached_transform(),
            _ => parent_world,
        };
        state.items.push(SerializedNode {
            key,
            type_name: node.type_name(),
            name: node.name.clone(),
            world_transform: world,
        });
        for &child in &node.children {
            self.serialize_node(child, world, state);
        }
    }
}
