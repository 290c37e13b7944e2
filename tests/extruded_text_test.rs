mod common;

use box_scene::{
    config::{ExtrudedTextConfig, MaterialColours, TextAnchor},
    data_structures::scene::Scene,
    text::{
        TextRenderer,
        extruded::{CoverageMask, ExtrudedText, anchor_offset, extrude},
    },
};
use cgmath::Vector3;
use common::test_utils::{FakeTypeface, approx_eq};

fn text(config: ExtrudedTextConfig) -> ExtrudedText {
    ExtrudedText::new(config, Box::new(FakeTypeface::new()))
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

#[test]
fn adjacent_cells_merge_into_runs() {
    let mask = CoverageMask::from_cells([(0, 0), (1, 0), (2, 0), (5, 0), (0, 1)]);
    assert_eq!(mask.runs(), vec![(0, 0, 3), (0, 5, 1), (1, 0, 1)]);
}

#[test]
fn each_run_becomes_one_box() {
    let mask = CoverageMask::from_cells([(0, 0), (1, 0), (2, 0)]);
    let mesh = extrude(&mask, 0.5, 2.0);
    assert_eq!(mesh.vertices.len(), 24);
    assert_eq!(mesh.indices.len(), 36);
    let (min, max) = mesh.bounds().unwrap();
    assert_eq!(min, [0.0, -0.5, 0.0]);
    assert_eq!(max, [1.5, 0.0, 2.0]);
}

#[test]
fn anchor_shifts_by_advance() {
    assert_eq!(anchor_offset(TextAnchor::Left, 10.0), 0.0);
    assert_eq!(anchor_offset(TextAnchor::Center, 10.0), -5.0);
    assert_eq!(anchor_offset(TextAnchor::Right, 10.0), -10.0);
}

#[test]
fn centred_letters_are_sized_by_height_and_thickness() {
    // 30 high at scale 0.25 over 24 cells gives 0.3125 per cell, 3.0 deep
    let mesh = text(ExtrudedTextConfig::default()).build_mesh();
    let (min, max) = mesh.bounds().unwrap();

    // "Hello World" advances 11 * 12 cells, centred
    assert!(close(min[0], -20.625), "min x {}", min[0]);
    assert!(close(max[0], 20.0), "max x {}", max[0]);
    assert!(close(min[1], 0.0));
    assert!(close(max[1], 17.0 * 0.3125));
    assert!(close(min[2], -1.5));
    assert!(close(max[2], 1.5));
}

#[test]
fn left_anchor_starts_at_the_origin() {
    let config = ExtrudedTextConfig {
        anchor: TextAnchor::Left,
        ..ExtrudedTextConfig::default()
    };
    let (min, _) = text(config).build_mesh().bounds().unwrap();
    assert!(close(min[0], 0.0));
}

#[test]
fn empty_text_yields_no_geometry() {
    let config = ExtrudedTextConfig {
        content: String::new(),
        ..ExtrudedTextConfig::default()
    };
    assert!(text(config).build_mesh().is_empty());
}

#[test]
fn attached_text_is_a_root_node_at_its_position() {
    let mut scene = Scene::new();
    let id = text(ExtrudedTextConfig::default())
        .attach(&mut scene)
        .unwrap();
    let node = scene.node(id).unwrap();
    assert_eq!(node.name, "text");
    assert_eq!(node.parent, None);
    assert!(approx_eq(
        scene.world(id).unwrap().position,
        Vector3::new(0.0, 10.0, 0.0)
    ));

    let material = node.material.and_then(|m| scene.material(m)).unwrap();
    let grey = 240.0 / 255.0;
    assert_eq!(material.base_colour, [grey, grey, grey, 1.0]);
    assert_eq!(material.specular, [0.0, 0.0, 0.0]);
    assert_eq!(material.emissive, [1.0, 0.0, 240.0 / 255.0]);
}

#[test]
fn missing_channels_fall_back_to_the_text_colour() {
    let config = ExtrudedTextConfig {
        colors: MaterialColours::default(),
        ..ExtrudedTextConfig::default()
    };
    let mut scene = Scene::new();
    let id = text(config).attach(&mut scene).unwrap();
    let material = scene
        .node(id)
        .and_then(|n| n.material)
        .and_then(|m| scene.material(m))
        .unwrap();
    let [r, g, b] = [0x1C, 0x38, 0x70].map(|c| c as f32 / 255.0);
    assert_eq!(material.base_colour, [r, g, b, 1.0]);
    assert_eq!(material.ambient, [r, g, b]);
    assert_eq!(material.specular, [0.0, 0.0, 0.0]);
}
