#![allow(dead_code)]

use std::{
    cell::Cell,
    collections::{BTreeSet, HashSet},
};

use box_scene::{
    RenderBackend,
    animation::{AnimationChannel, AnimationGroup, Interpolation, Keyframes, sequencer::ClipPlayer},
    data_structures::{
        instance::Instance,
        mesh::MeshData,
        scene::{Node, Scene},
    },
    error::SceneError,
    resources::AssetLoader,
    text::Typeface,
};
use cgmath::Vector3;

/// A monospace stand-in font: every char advances `advance * px` and paints a
/// solid block of 80 % of its advance, 70 % of `px` high above the baseline.
pub(crate) struct FakeTypeface {
    pub advance: f32,
}

impl FakeTypeface {
    pub fn new() -> Self {
        Self { advance: 0.5 }
    }

    /// Measures zero for every string.
    pub fn blank() -> Self {
        Self { advance: 0.0 }
    }
}

impl Typeface for FakeTypeface {
    fn family(&self) -> &str {
        "Fake"
    }

    fn measure(&self, text: &str, px: f32) -> f32 {
        text.chars().count() as f32 * self.advance * px
    }

    fn draw(&self, text: &str, px: f32, origin: (f32, f32), plot: &mut dyn FnMut(i32, i32, f32)) {
        let advance = self.advance * px;
        for i in 0..text.chars().count() {
            let left = origin.0 + i as f32 * advance;
            let right = left + advance * 0.8;
            let top = origin.1 - px * 0.7;
            for y in (top.floor() as i32)..(origin.1.ceil() as i32) {
                for x in (left.floor() as i32)..(right.ceil() as i32) {
                    plot(x, y, 1.0);
                }
            }
        }
    }
}

#[derive(Default)]
pub(crate) struct RecordingBackend {
    pub prepared: usize,
    pub rendered: usize,
    pub resizes: Vec<(u32, u32)>,
    pub last_node_count: usize,
}

impl RenderBackend for RecordingBackend {
    fn prepare(&mut self, scene: &Scene) -> anyhow::Result<()> {
        self.prepared += 1;
        self.last_node_count = scene.nodes().len();
        Ok(())
    }

    fn render(&mut self, _scene: &Scene) -> anyhow::Result<()> {
        self.rendered += 1;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.resizes.push((width, height));
    }
}

/// Hands out a freshly built scene, or fails, without touching the filesystem.
pub(crate) struct MemoryLoader {
    build: fn() -> Scene,
    fail: bool,
    pub loads: Cell<usize>,
}

impl MemoryLoader {
    pub fn new(build: fn() -> Scene) -> Self {
        Self {
            build,
            fail: false,
            loads: Cell::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            build: Scene::new,
            fail: true,
            loads: Cell::new(0),
        }
    }
}

impl AssetLoader for MemoryLoader {
    async fn load(&self, file_name: &str) -> anyhow::Result<Scene> {
        self.loads.set(self.loads.get() + 1);
        if self.fail {
            anyhow::bail!("{} does not exist", file_name);
        }
        Ok((self.build)())
    }
}

#[derive(Default)]
pub(crate) struct RecordingClipPlayer {
    pub clips: HashSet<String>,
    pub started: Vec<String>,
}

impl RecordingClipPlayer {
    pub fn with_clips(names: &[&str]) -> Self {
        Self {
            clips: names.iter().map(|n| n.to_string()).collect(),
            started: Vec::new(),
        }
    }
}

impl ClipPlayer for RecordingClipPlayer {
    fn has_clip(&self, name: &str) -> bool {
        self.clips.contains(name)
    }

    fn start_clip(&mut self, name: &str) -> Result<(), SceneError> {
        if !self.has_clip(name) {
            return Err(SceneError::missing_animation_group(name));
        }
        self.started.push(name.to_string());
        Ok(())
    }
}

pub const ANCHOR_POSITION: [f32; 3] = [1.0, 2.0, 3.0];

/// Translation clip on `target` moving it from the origin to (0, 1, 0).
pub fn clip(name: &str, target: usize, duration: f32) -> AnimationGroup {
    AnimationGroup::new(
        name,
        vec![AnimationChannel {
            target,
            keyframes: Keyframes::Translation(vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
            ]),
            timestamps: vec![0.0, duration],
            interpolation: Interpolation::Linear,
        }],
    )
}

fn base_scene(clips: &[(&str, f32)]) -> Scene {
    let mut scene = Scene::new();
    let mut cube = MeshData::default();
    cube.push_cuboid([-0.5, -0.5, -0.5], [0.5, 0.5, 0.5]);
    let box_id = scene.add_node(Node::new("box").with_mesh(cube));
    let anchor = Node::new("EMPTY").with_transform(Instance::from(Vector3::from(ANCHOR_POSITION)));
    let anchor_id = scene.add_node(anchor);
    for &(name, duration) in clips {
        let target = if name == "empty_falling" {
            anchor_id
        } else {
            box_id
        };
        scene.add_animation_group(clip(name, target, duration));
    }
    scene
}

/// The packaged scene in miniature: `box`, `EMPTY` and the three clips.
pub fn box_scene() -> Scene {
    base_scene(&[("box_open", 1.0), ("empty_falling", 1.0), ("box_close", 0.5)])
}

pub fn box_scene_without_close() -> Scene {
    base_scene(&[("box_open", 1.0), ("empty_falling", 1.0)])
}

pub fn box_scene_without_anchor() -> Scene {
    let mut scene = Scene::new();
    let box_id = scene.add_node(Node::new("box"));
    scene.add_animation_group(clip("box_open", box_id, 1.0));
    scene.add_animation_group(clip("empty_falling", box_id, 1.0));
    scene.add_animation_group(clip("box_close", box_id, 0.5));
    scene
}

pub fn names_of(scene: &Scene) -> BTreeSet<String> {
    scene.nodes().iter().map(|n| n.name.clone()).collect()
}

pub fn approx_eq(a: Vector3<f32>, b: Vector3<f32>) -> bool {
    (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4 && (a.z - b.z).abs() < 1e-4
}
