#![allow(dead_code)]

use std::collections::HashSet;

use cgmath::{Matrix4, Vector3};
use raygraph::{
    Aabb, GeometryInput, GeometryNode, InstanceHandle, ModelHandle, NodeKey, RenderBackend,
    RenderContext, SceneError, SceneGraph,
};

/// One recorded backend invocation, in call order.
#[derive(Clone, Debug, PartialEq)]
pub enum BackendCall {
    CreateModel {
        handle: ModelHandle,
        inputs: Vec<GeometryInput>,
    },
    ReleaseModel(ModelHandle),
    CreateInstance {
        handle: InstanceHandle,
        model: ModelHandle,
        transform: Matrix4<f32>,
    },
    ReleaseInstance(InstanceHandle),
    BeginFrame,
    RenderModel(ModelHandle),
    EndFrame,
}

/// Test double for the native rendering library: records every call, hands
/// out unique handles, tracks live handles (double releases panic), and can
/// inject model-build failures.
#[derive(Default)]
pub struct RecordingBackend {
    next_handle: u64,
    pub calls: Vec<BackendCall>,
    pub live_models: HashSet<ModelHandle>,
    pub live_instances: HashSet<InstanceHandle>,
    pub fail_models: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self::default()
    }

    pub fn models_created(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, BackendCall::CreateModel { .. }))
            .count()
    }

    pub fn instances_created(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, BackendCall::CreateInstance { .. }))
            .count()
    }

    /// The inputs the given model handle was built from.
    pub fn model_inputs(&self, model: ModelHandle) -> Option<Vec<GeometryInput>> {
        self.calls.iter().rev().find_map(|call| match call {
            BackendCall::CreateModel { handle, inputs } if *handle == model => {
                Some(inputs.clone())
            }
            _ => None,
        })
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl RenderBackend for RecordingBackend {
    fn create_model(&mut self, inputs: &[GeometryInput]) -> Result<ModelHandle, SceneError> {
        if self.fail_models {
            return Err(SceneError::Backend {
                what: "model",
                reason: "injected failure".into(),
            });
        }
        self.next_handle += 1;
        let handle = ModelHandle(self.next_handle);
        self.live_models.insert(handle);
        self.calls.push(BackendCall::CreateModel {
            handle,
            inputs: inputs.to_vec(),
        });
        Ok(handle)
    }

    fn release_model(&mut self, model: ModelHandle) {
        assert!(
            self.live_models.remove(&model),
            "double release of {model:?}"
        );
        self.calls.push(BackendCall::ReleaseModel(model));
    }

    fn create_instance(
        &mut self,
        model: ModelHandle,
        transform: Matrix4<f32>,
    ) -> Result<InstanceHandle, SceneError> {
        assert!(
            self.live_models.contains(&model),
            "instancing a released or unknown model {model:?}"
        );
        self.next_handle += 1;
        let handle = InstanceHandle(self.next_handle);
        self.live_instances.insert(handle);
        self.calls.push(BackendCall::CreateInstance {
            handle,
            model,
            transform,
        });
        Ok(handle)
    }

    fn release_instance(&mut self, instance: InstanceHandle) {
        assert!(
            self.live_instances.remove(&instance),
            "double release of {instance:?}"
        );
        self.calls.push(BackendCall::ReleaseInstance(instance));
    }

    fn begin_frame(&mut self) {
        self.calls.push(BackendCall::BeginFrame);
    }

    fn render_model(&mut self, model: ModelHandle) {
        assert!(
            self.live_models.contains(&model),
            "rendering a released or unknown model {model:?}"
        );
        self.calls.push(BackendCall::RenderModel(model));
    }

    fn end_frame(&mut self) {
        self.calls.push(BackendCall::EndFrame);
    }
}

/// A 2x2x2 box centred at the origin, 12 triangles.
pub fn unit_box() -> GeometryNode {
    GeometryNode::new(
        Aabb::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0)),
        12,
    )
}

/// A world with one geometry child. Returns `(graph, world, geometry)`.
pub fn world_with_box() -> (SceneGraph, NodeKey, NodeKey) {
    let mut graph = SceneGraph::new();
    let world = graph.add_world("world");
    let geometry = graph.add_geometry("box", unit_box());
    graph.add_child(world, geometry).expect("link geometry");
    (graph, world, geometry)
}

/// Run one commit pass with a fresh context.
pub fn commit(
    graph: &mut SceneGraph,
    root: NodeKey,
    backend: &mut RecordingBackend,
) -> Result<(), SceneError> {
    let mut ctx = RenderContext::new(backend);
    graph.commit(root, &mut ctx)
}

/// Run one render pass with a fresh context.
pub fn render(
    graph: &SceneGraph,
    root: NodeKey,
    backend: &mut RecordingBackend,
) -> Result<(), SceneError> {
    let mut ctx = RenderContext::new(backend);
    graph.render(root, &mut ctx)
}
