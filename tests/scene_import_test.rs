use std::path::Path;

use box_scene::{animation::Keyframes, resources::scene_import::import_scene};
use futures::executor::block_on;

const SCENE_JSON: &str = r#"{
    "asset": { "version": "2.0" },
    "scene": 0,
    "scenes": [{ "nodes": [0, 1] }],
    "nodes": [
        { "name": "box" },
        { "name": "EMPTY", "translation": [1.0, 2.0, 3.0], "children": [2] },
        { "name": "marker", "translation": [0.0, 1.0, 0.0] }
    ],
    "buffers": [{ "byteLength": 32 }],
    "bufferViews": [
        { "buffer": 0, "byteOffset": 0, "byteLength": 8 },
        { "buffer": 0, "byteOffset": 8, "byteLength": 24 }
    ],
    "accessors": [
        { "bufferView": 0, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [0.0], "max": [1.0] },
        { "bufferView": 1, "componentType": 5126, "count": 2, "type": "VEC3" }
    ],
    "animations": [{
        "name": "box_open",
        "samplers": [{ "input": 0, "output": 1, "interpolation": "LINEAR" }],
        "channels": [{ "sampler": 0, "target": { "node": 0, "path": "translation" } }]
    }]
}"#;

fn chunk(kind: &[u8; 4], mut data: Vec<u8>, pad: u8) -> Vec<u8> {
    while data.len() % 4 != 0 {
        data.push(pad);
    }
    let mut out = (data.len() as u32).to_le_bytes().to_vec();
    out.extend_from_slice(kind);
    out.extend(data);
    out
}

const TRUNCATED_IMAGE_JSON: &str = r#"{
    "asset": { "version": "2.0" },
    "buffers": [{ "byteLength": 64 }],
    "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 64 }],
    "images": [{ "bufferView": 0, "mimeType": "image/png" }]
}"#;

fn glb() -> Vec<u8> {
    let floats: [f32; 8] = [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    let bin: Vec<u8> = floats.iter().flat_map(|f| f.to_le_bytes()).collect();
    pack(SCENE_JSON, bin)
}

fn pack(json: &str, bin: Vec<u8>) -> Vec<u8> {
    let json = chunk(b"JSON", json.as_bytes().to_vec(), b' ');
    let bin = chunk(b"BIN\0", bin, 0);

    let mut out = b"glTF".to_vec();
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&((12 + json.len() + bin.len()) as u32).to_le_bytes());
    out.extend(json);
    out.extend(bin);
    out
}

#[test]
fn nodes_keep_names_and_hierarchy() {
    let scene = block_on(import_scene(&glb(), Path::new("."))).unwrap();

    let anchor = scene.mesh_by_name("EMPTY").unwrap();
    let marker = scene.mesh_by_name("marker").unwrap();
    assert_eq!(scene.node(marker).unwrap().parent, Some(anchor));

    let world = scene.world(marker).unwrap().position;
    assert_eq!((world.x, world.y, world.z), (1.0, 3.0, 3.0));
}

#[test]
fn animations_become_named_groups() {
    let mut scene = block_on(import_scene(&glb(), Path::new("."))).unwrap();

    let group = scene.animation_group_by_name("box_open").unwrap();
    assert_eq!(group.channels.len(), 1);
    assert_eq!(group.duration(), 1.0);
    assert!(!group.is_playing());
    assert!(matches!(
        group.channels[0].keyframes,
        Keyframes::Translation(ref v) if v.len() == 2
    ));

    scene.animation_group_by_name_mut("box_open").unwrap().start();
    scene.advance_animations(0.5);
    let box_id = scene.mesh_by_name("box").unwrap();
    assert!((scene.world(box_id).unwrap().position.y - 0.5).abs() < 1e-5);
}

#[test]
fn garbage_is_rejected() {
    assert!(block_on(import_scene(b"not a gltf", Path::new("."))).is_err());
}

#[test]
fn truncated_binary_chunk_is_an_error() {
    let bytes = pack(TRUNCATED_IMAGE_JSON, vec![0; 4]);
    let err = block_on(import_scene(&bytes, Path::new("."))).unwrap_err();
    assert!(format!("{:#}", err).contains("64"));
}
