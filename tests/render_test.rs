//! Render-pass replay: one frame is a frame bracket plus the cached root
//! handle, independent of scene complexity, and serialization flattens the
//! committed tree with composed transforms.

use cgmath::{Matrix4, SquareMatrix, Vector3};
use common::test_utils::{BackendCall, RecordingBackend, commit, render, unit_box, world_with_box};
use raygraph::{InstanceNode, RenderContext, SceneGraph, Serialization, Transform};

mod common;

#[test]
fn render_replays_the_cached_root_handle() {
    let (mut graph, world, _) = world_with_box();
    let mut backend = RecordingBackend::new();
    commit(&mut graph, world, &mut backend).expect("commit");
    let handle = graph.world(world).unwrap().model.model().unwrap();

    backend.clear_calls();
    render(&graph, world, &mut backend).expect("render");
    assert_eq!(
        backend.calls,
        vec![
            BackendCall::BeginFrame,
            BackendCall::RenderModel(handle),
            BackendCall::EndFrame,
        ],
        "a frame is exactly the bracket plus the cached handle"
    );

    // Repeated frames replay the same handle with no commit-time work.
    backend.clear_calls();
    render(&graph, world, &mut backend).expect("render");
    assert_eq!(backend.calls.len(), 3);
    assert_eq!(backend.models_created(), 0);
}

#[test]
fn render_before_commit_renders_nothing() {
    let (graph, world, _) = world_with_box();
    let mut backend = RecordingBackend::new();

    render(&graph, world, &mut backend).expect("render");
    assert_eq!(
        backend.calls,
        vec![BackendCall::BeginFrame, BackendCall::EndFrame]
    );
}

#[test]
fn model_root_has_no_render_hooks() {
    let mut graph = SceneGraph::new();
    let model = graph.add_model("standalone");
    let geometry = graph.add_geometry("box", unit_box());
    graph.add_child(model, geometry).unwrap();

    let mut backend = RecordingBackend::new();
    commit(&mut graph, model, &mut backend).expect("commit");
    let handle = graph.model(model).unwrap().model().unwrap();

    backend.clear_calls();
    render(&graph, model, &mut backend).expect("render");
    assert_eq!(backend.calls, vec![BackendCall::RenderModel(handle)]);
}

#[test]
fn frame_counter_advances_per_render() {
    let (mut graph, world, _) = world_with_box();
    let mut backend = RecordingBackend::new();
    commit(&mut graph, world, &mut backend).expect("commit");

    let mut ctx = RenderContext::new(&mut backend);
    graph.render(world, &mut ctx).expect("render");
    graph.render(world, &mut ctx).expect("render");
    assert_eq!(ctx.frame, 2);
}

#[test]
fn unknown_traverse_operation_is_inert() {
    let (mut graph, world, _) = world_with_box();
    let mut backend = RecordingBackend::new();
    commit(&mut graph, world, &mut backend).expect("commit");

    backend.clear_calls();
    let mut ctx = RenderContext::new(&mut backend);
    graph
        .traverse(world, &mut ctx, "inventory")
        .expect("free extension point");
    assert!(backend.calls.is_empty());
}

#[test]
fn serialize_flattens_with_composed_transforms() -> anyhow::Result<()> {
    let mut graph = SceneGraph::new();
    let world = graph.add_world("world");
    let position = Vector3::new(2.0, 0.0, 0.0);
    let instance = graph.add_instance(
        "placed",
        InstanceNode::with_transform(Transform::from_position(position)),
    );
    let geometry = graph.add_geometry("box", unit_box());
    graph.add_child(world, instance)?;
    graph.add_child(instance, geometry)?;

    let mut backend = RecordingBackend::new();
    commit(&mut graph, world, &mut backend)?;

    let mut state = Serialization::default();
    graph.serialize(world, &mut state);

    assert_eq!(state.items.len(), 3);
    assert_eq!(state.items[0].type_name, "World");
    assert_eq!(state.items[0].world_transform, Matrix4::identity());
    assert_eq!(state.items[1].type_name, "Instance");
    assert_eq!(
        state.items[1].world_transform,
        Matrix4::from_translation(position),
        "the instance row carries its own composed placement"
    );
    assert_eq!(state.items[2].type_name, "Geometry");
    assert_eq!(
        state.items[2].world_transform,
        Matrix4::from_translation(position),
        "the child inherits the instance's composed transform"
    );
    Ok(())
}
