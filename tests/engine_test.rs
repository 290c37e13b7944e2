mod common;

use box_scene::{
    EngineService, SceneConfig,
    animation::sequencer::SequenceState,
    engine::RenderLoop,
    text::text_renderer,
};
use common::test_utils::{
    FakeTypeface, MemoryLoader, RecordingBackend, box_scene, box_scene_without_anchor,
    box_scene_without_close,
};
use futures::executor::block_on;
use instant::Duration;
use winit::{dpi::PhysicalSize, event::WindowEvent};

fn engine() -> EngineService<RecordingBackend> {
    let config = SceneConfig::default();
    let text = text_renderer(&config, Box::new(FakeTypeface::new()));
    EngineService::new(config, RecordingBackend::default(), text)
}

fn resized(width: u32, height: u32) -> WindowEvent {
    WindowEvent::Resized(PhysicalSize::new(width, height))
}

fn playing(engine: &EngineService<RecordingBackend>) -> Vec<String> {
    engine
        .scene()
        .animation_groups()
        .iter()
        .filter(|g| g.is_playing())
        .map(|g| g.name.clone())
        .collect()
}

#[test]
fn loaded_scene_is_composed_and_uploaded() {
    let mut engine = engine();
    let loader = MemoryLoader::new(box_scene);
    block_on(engine.load_scene(&loader)).unwrap();

    assert_eq!(loader.loads.get(), 1);
    assert_eq!(engine.backend().prepared, 1);
    assert_eq!(engine.backend().last_node_count, 3);
    assert!(engine.scene().mesh_by_name("plane").is_ok());
    assert_eq!(engine.sequence_state(), SequenceState::Opening);
    assert_eq!(playing(&engine), vec!["box_open"]);
}

#[test]
fn failed_load_leaves_an_empty_scene() {
    let mut engine = engine();
    block_on(engine.load_scene(&MemoryLoader::new(box_scene))).unwrap();
    assert_eq!(engine.backend().last_node_count, 3);

    block_on(engine.load_scene(&MemoryLoader::failing())).unwrap();

    assert!(engine.scene().is_empty());
    assert_eq!(engine.backend().prepared, 2);
    assert_eq!(engine.backend().last_node_count, 0);
    assert_eq!(engine.sequence_state(), SequenceState::Idle);

    // rendering an empty scene is fine
    engine.animate(true);
    engine.frame(Duration::from_millis(16)).unwrap();
    assert_eq!(engine.backend().rendered, 1);
}

#[test]
fn unusable_text_clears_the_previous_scene() {
    let config = SceneConfig::default();
    let text = text_renderer(&config, Box::new(FakeTypeface::blank()));
    let mut engine = EngineService::new(config, RecordingBackend::default(), text);

    assert!(block_on(engine.load_scene(&MemoryLoader::new(box_scene))).is_err());

    assert!(engine.scene().is_empty());
    assert_eq!(engine.backend().prepared, 1);
    assert_eq!(engine.backend().last_node_count, 0);
    assert_eq!(engine.sequence_state(), SequenceState::Idle);
}

#[test]
fn reloading_does_not_duplicate_the_text() {
    let mut engine = engine();
    let loader = MemoryLoader::new(box_scene);
    block_on(engine.load_scene(&loader)).unwrap();
    block_on(engine.load_scene(&loader)).unwrap();

    let planes = engine
        .scene()
        .nodes()
        .iter()
        .filter(|n| n.name == "plane")
        .count();
    assert_eq!(planes, 1);
    assert_eq!(engine.backend().prepared, 2);
}

#[test]
fn missing_anchor_still_animates_the_box() {
    let mut engine = engine();
    block_on(engine.load_scene(&MemoryLoader::new(box_scene_without_anchor))).unwrap();

    assert!(engine.scene().mesh_by_name("plane").is_err());
    assert_eq!(engine.sequence_state(), SequenceState::Opening);
    assert_eq!(engine.backend().prepared, 1);
}

#[test]
fn missing_clip_keeps_everything_stopped() {
    let mut engine = engine();
    block_on(engine.load_scene(&MemoryLoader::new(box_scene_without_close))).unwrap();

    assert_eq!(engine.sequence_state(), SequenceState::Idle);
    assert!(playing(&engine).is_empty());
    assert!(engine.scene().mesh_by_name("plane").is_ok());
}

#[test]
fn frames_drive_the_sequence_to_the_end() {
    let mut engine = engine();
    block_on(engine.load_scene(&MemoryLoader::new(box_scene))).unwrap();
    engine.animate(true);

    engine.frame(Duration::from_millis(500)).unwrap();
    assert_eq!(engine.sequence_state(), SequenceState::Opening);

    engine.frame(Duration::from_millis(600)).unwrap();
    assert_eq!(engine.sequence_state(), SequenceState::Falling);
    assert_eq!(playing(&engine), vec!["empty_falling"]);

    engine.frame(Duration::from_millis(1100)).unwrap();
    assert_eq!(engine.sequence_state(), SequenceState::Closing);
    assert_eq!(playing(&engine), vec!["box_close"]);

    engine.frame(Duration::from_millis(600)).unwrap();
    assert_eq!(engine.sequence_state(), SequenceState::Done);
    assert!(playing(&engine).is_empty());
    assert_eq!(engine.backend().rendered, 4);
}

#[test]
fn frames_before_animate_do_nothing() {
    let mut engine = engine();
    block_on(engine.load_scene(&MemoryLoader::new(box_scene))).unwrap();

    engine.frame(Duration::from_secs(5)).unwrap();
    assert_eq!(engine.backend().rendered, 0);
    assert_eq!(engine.sequence_state(), SequenceState::Opening);
}

#[test]
fn resize_is_forwarded_only_once_running() {
    let mut engine = engine();
    block_on(engine.load_scene(&MemoryLoader::new(box_scene))).unwrap();

    engine.handle_window_event(&resized(640, 480));
    assert!(engine.backend().resizes.is_empty());

    engine.animate(true);
    engine.handle_window_event(&resized(800, 600));
    engine.handle_window_event(&resized(1024, 768));
    assert_eq!(engine.backend().resizes, vec![(800, 600), (1024, 768)]);

    // calling animate again must not register a second listener
    engine.animate(true);
    engine.handle_window_event(&resized(320, 200));
    assert_eq!(engine.backend().resizes.len(), 3);
}

#[test]
fn animate_waits_for_the_host() {
    let mut engine = engine();
    assert_eq!(engine.render_loop(), RenderLoop::Stopped);

    engine.on_host_ready();
    assert_eq!(engine.render_loop(), RenderLoop::Stopped);

    engine.animate(false);
    assert_eq!(engine.render_loop(), RenderLoop::WaitingForHost);
    engine.frame(Duration::from_millis(16)).unwrap();
    assert_eq!(engine.backend().rendered, 0);

    engine.on_host_ready();
    assert_eq!(engine.render_loop(), RenderLoop::Running);
}

#[test]
fn text_plane_rides_along_with_the_falling_anchor() {
    let mut engine = engine();
    block_on(engine.load_scene(&MemoryLoader::new(box_scene))).unwrap();
    engine.animate(true);

    // open ends, then half of the fall clip moves the anchor to y = 0.5
    engine.frame(Duration::from_millis(1000)).unwrap();
    engine.frame(Duration::from_millis(500)).unwrap();

    let scene = engine.scene();
    let anchor = scene.mesh_by_name("EMPTY").unwrap();
    let plane = scene.mesh_by_name("plane").unwrap();
    let anchor_y = scene.world(anchor).unwrap().position.y;
    let plane_y = scene.world(plane).unwrap().position.y;
    assert!((anchor_y - 0.5).abs() < 1e-4, "anchor y {}", anchor_y);
    assert!((plane_y - anchor_y - 0.5).abs() < 1e-4);
}
