//! glTF/GLB import into [`Scene`].
//!
//! External buffers and images are fetched first (the only async part), then
//! nodes, materials and animations are converted in one synchronous pass.

use std::{collections::HashMap, path::Path};

use anyhow::{Context as _, bail};
use gltf::animation::{Interpolation as GltfInterpolation, util::ReadOutputs};
use image::RgbaImage;

use crate::{
    animation::{AnimationChannel, AnimationGroup, Interpolation, Keyframes},
    data_structures::{
        instance::Instance,
        material::Material,
        mesh::{MeshData, ModelVertex},
        scene::{MaterialId, Node, NodeId, Scene},
    },
    resources::load_binary,
};

pub async fn import_scene(bytes: &[u8], base: &Path) -> anyhow::Result<Scene> {
    let gltf = gltf::Gltf::from_slice(bytes)?;

    let mut buffers: Vec<Vec<u8>> = Vec::new();
    for buffer in gltf.buffers() {
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => gltf
                .blob
                .clone()
                .context("GLB references a binary chunk it does not contain")?,
            gltf::buffer::Source::Uri(uri) => load_uri(base, uri).await?,
        };
        if data.len() < buffer.length() {
            bail!(
                "Buffer {} holds {} bytes but declares {}",
                buffer.index(),
                data.len(),
                buffer.length()
            );
        }
        buffers.push(data);
    }

    let mut images = Vec::new();
    for image in gltf.images() {
        let bytes = match image.source() {
            gltf::image::Source::View { view, .. } => {
                let range = view.offset()..view.offset() + view.length();
                buffers
                    .get(view.buffer().index())
                    .and_then(|buffer| buffer.get(range))
                    .with_context(|| format!("Image {} view out of range", image.index()))?
                    .to_vec()
            }
            gltf::image::Source::Uri { uri, .. } => load_uri(base, uri).await?,
        };
        let decoded = image::load_from_memory(&bytes)
            .with_context(|| format!("Cannot decode image {}", image.index()))?;
        images.push(decoded.to_rgba8());
    }

    Ok(build_scene(&gltf.document, &buffers, &images))
}

async fn load_uri(base: &Path, uri: &str) -> anyhow::Result<Vec<u8>> {
    if uri.starts_with("data:") {
        bail!("Embedded data URIs are not supported, export as .glb instead");
    }
    load_binary(&base.join(uri)).await
}

fn build_scene(document: &gltf::Document, buffers: &[Vec<u8>], images: &[RgbaImage]) -> Scene {
    let mut scene = Scene::new();

    let materials: Vec<MaterialId> = document
        .materials()
        .map(|m| scene.add_material(to_material(&m, images)))
        .collect();
    let mut default_material = None;

    let mut node_ids = HashMap::new();
    let gltf_scene = document.default_scene().or_else(|| document.scenes().next());
    if let Some(gltf_scene) = gltf_scene {
        for node in gltf_scene.nodes() {
            add_node(
                &mut scene,
                &node,
                None,
                buffers,
                &materials,
                &mut default_material,
                &mut node_ids,
            );
        }
    }

    for animation in document.animations() {
        let name = animation
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("animation{}", animation.index()));
        let channels = animation
            .channels()
            .filter_map(|channel| to_channel(&name, &channel, buffers, &node_ids))
            .collect();
        scene.add_animation_group(AnimationGroup::new(&name, channels));
    }

    scene
}

fn to_material(material: &gltf::Material, images: &[RgbaImage]) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let mut out = Material::new(material.name().unwrap_or("material"));
    out.base_colour = pbr.base_color_factor();
    out.emissive = material.emissive_factor();
    out.diffuse = pbr
        .base_color_texture()
        .and_then(|info| images.get(info.texture().source().index()).cloned());
    out
}

#[allow(clippy::too_many_arguments)]
fn add_node(
    scene: &mut Scene,
    node: &gltf::Node,
    parent: Option<NodeId>,
    buffers: &[Vec<u8>],
    materials: &[MaterialId],
    default_material: &mut Option<MaterialId>,
    node_ids: &mut HashMap<usize, NodeId>,
) {
    let name = node
        .name()
        .or_else(|| node.mesh().and_then(|m| m.name()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("node{}", node.index()));

    let (translation, [x, y, z, w], scale) = node.transform().decomposed();
    let local = Instance {
        position: translation.into(),
        rotation: cgmath::Quaternion::new(w, x, y, z),
        scale: scale.into(),
    };
    let mut scene_node = Node::new(&name).with_transform(local);
    scene_node.parent = parent;
    let id = scene.add_node(scene_node);
    node_ids.insert(node.index(), id);

    if let Some(mesh) = node.mesh() {
        let mut primitives = Vec::new();
        for primitive in mesh.primitives() {
            let material = match primitive.material().index() {
                Some(idx) => materials[idx],
                None => *default_material
                    .get_or_insert_with(|| scene.add_material(Material::default())),
            };
            primitives.push((read_primitive(&primitive, buffers), material));
        }
        // the first primitive lives on the node itself, extra ones become children
        let mut primitives = primitives.into_iter();
        if let Some((data, material)) = primitives.next() {
            if let Some(n) = scene.node_mut(id) {
                n.mesh = Some(data);
                n.material = Some(material);
            }
        }
        for (i, (data, material)) in primitives.enumerate() {
            let mut child = Node::new(&format!("{}_primitive{}", name, i + 1)).with_mesh(data);
            child.parent = Some(id);
            child.material = Some(material);
            scene.add_node(child);
        }
    }

    for child in node.children() {
        add_node(
            scene,
            &child,
            Some(id),
            buffers,
            materials,
            default_material,
            node_ids,
        );
    }
}

fn read_primitive(primitive: &gltf::Primitive, buffers: &[Vec<u8>]) -> MeshData {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

    let mut vertices: Vec<ModelVertex> = reader
        .read_positions()
        .map(|positions| {
            positions
                .map(|position| ModelVertex {
                    position,
                    ..Default::default()
                })
                .collect()
        })
        .unwrap_or_default();
    if let Some(normals) = reader.read_normals() {
        vertices
            .iter_mut()
            .zip(normals)
            .for_each(|(v, normal)| v.normal = normal);
    }
    if let Some(tex_coords) = reader.read_tex_coords(0) {
        vertices
            .iter_mut()
            .zip(tex_coords.into_f32())
            .for_each(|(v, uv)| v.tex_coords = uv);
    }
    let indices = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };

    MeshData { vertices, indices }
}

fn to_channel(
    group: &str,
    channel: &gltf::animation::Channel,
    buffers: &[Vec<u8>],
    node_ids: &HashMap<usize, NodeId>,
) -> Option<AnimationChannel> {
    let Some(&target) = node_ids.get(&channel.target().node().index()) else {
        log::warn!(
            "Animation {} targets node {} outside the loaded scene",
            group,
            channel.target().node().index()
        );
        return None;
    };
    let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
    let timestamps: Vec<f32> = reader.read_inputs()?.collect();
    let interpolation = match channel.sampler().interpolation() {
        GltfInterpolation::Linear => Interpolation::Linear,
        GltfInterpolation::Step => Interpolation::Step,
        GltfInterpolation::CubicSpline => Interpolation::CubicSpline,
    };
    // cubic splines store (in-tangent, value, out-tangent) triples
    let keep = |i: usize| interpolation != Interpolation::CubicSpline || i % 3 == 1;

    let keyframes = match reader.read_outputs()? {
        ReadOutputs::Translations(it) => Keyframes::Translation(
            it.enumerate()
                .filter(|(i, _)| keep(*i))
                .map(|(_, t)| t.into())
                .collect(),
        ),
        ReadOutputs::Rotations(it) => Keyframes::Rotation(
            it.into_f32()
                .enumerate()
                .filter(|(i, _)| keep(*i))
                .map(|(_, [x, y, z, w])| cgmath::Quaternion::new(w, x, y, z))
                .collect(),
        ),
        ReadOutputs::Scales(it) => Keyframes::Scale(
            it.enumerate()
                .filter(|(i, _)| keep(*i))
                .map(|(_, s)| s.into())
                .collect(),
        ),
        ReadOutputs::MorphTargetWeights(_) => {
            log::warn!("Animation {} uses morph targets, skipping channel", group);
            return None;
        }
    };
    if keyframes.is_empty() {
        log::warn!("Animation {} has an empty channel", group);
        return None;
    }

    Some(AnimationChannel {
        target,
        keyframes,
        timestamps,
        interpolation,
    })
}
