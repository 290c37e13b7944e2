//! GPU mirror of a [`Scene`].
//!
//! [`GpuScene::upload`] turns every mesh-carrying node into vertex, index and
//! instance buffers and every material into a bind group. Geometry never
//! changes after upload; only the per-node instance buffer is rewritten each
//! frame from the node's world transform.

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        instance::InstanceRaw,
        material::Material,
        scene::{NodeId, Scene},
        texture::Texture,
    },
    pipelines::basic::MaterialUniform,
};

pub struct GpuMaterial {
    #[allow(unused)]
    pub name: String,
    pub bind_group: wgpu::BindGroup,
}

impl GpuMaterial {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        material: &Material,
    ) -> Self {
        let texture = match &material.diffuse {
            Some(image) => Texture::from_image(device, queue, image, Some(&material.name)),
            None => Texture::solid(device, queue, [255, 255, 255, 255]),
        };
        let uniform = MaterialUniform {
            base_colour: material.base_colour,
            specular: extend(material.specular),
            ambient: extend(material.ambient),
            emissive: extend(material.emissive),
        };
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Material Buffer", material.name)),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let sampler = texture
            .sampler
            .unwrap_or_else(|| crate::data_structures::texture::create_default_sampler(device));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buffer.as_entire_binding(),
                },
            ],
            label: Some(&material.name),
        });
        Self {
            name: material.name.clone(),
            bind_group,
        }
    }
}

fn extend(rgb: [f32; 3]) -> [f32; 4] {
    [rgb[0], rgb[1], rgb[2], 0.0]
}

pub struct GpuMesh {
    pub node: NodeId,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub instance_buffer: wgpu::Buffer,
    pub num_elements: u32,
    /// Index into [`GpuScene::materials`]; the last entry is the fallback.
    pub material: usize,
}

pub struct GpuScene {
    pub meshes: Vec<GpuMesh>,
    pub materials: Vec<GpuMaterial>,
}

impl GpuScene {
    pub fn empty() -> Self {
        Self {
            meshes: Vec::new(),
            materials: Vec::new(),
        }
    }

    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        scene: &Scene,
    ) -> Self {
        let mut materials: Vec<GpuMaterial> = scene
            .materials()
            .iter()
            .map(|m| GpuMaterial::new(device, queue, layout, m))
            .collect();
        let fallback = materials.len();
        materials.push(GpuMaterial::new(
            device,
            queue,
            layout,
            &Material::new("default"),
        ));

        let meshes = scene
            .nodes()
            .iter()
            .enumerate()
            .filter_map(|(id, node)| {
                let mesh = node.mesh.as_ref().filter(|m| !m.is_empty())?;
                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{:?} Vertex Buffer", node.name)),
                    contents: bytemuck::cast_slice(&mesh.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{:?} Index Buffer", node.name)),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                let instance_buffer =
                    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{:?} Instance Buffer", node.name)),
                        contents: bytemuck::cast_slice(&[node.world().to_raw()]),
                        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    });
                Some(GpuMesh {
                    node: id,
                    vertex_buffer,
                    index_buffer,
                    instance_buffer,
                    num_elements: mesh.indices.len() as u32,
                    material: node.material.filter(|m| *m < fallback).unwrap_or(fallback),
                })
            })
            .collect::<Vec<_>>();

        log::info!(
            "Uploaded {} meshes and {} materials",
            meshes.len(),
            materials.len()
        );
        Self { meshes, materials }
    }

    /// Rewrites every instance buffer from the current world transforms.
    pub fn sync_transforms(&self, queue: &wgpu::Queue, scene: &Scene) {
        for mesh in &self.meshes {
            if let Some(node) = scene.node(mesh.node) {
                let raw: InstanceRaw = node.world().to_raw();
                queue.write_buffer(&mesh.instance_buffer, 0, bytemuck::cast_slice(&[raw]));
            }
        }
    }

    pub fn draw(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    ) {
        render_pass.set_bind_group(1, camera_bind_group, &[]);
        render_pass.set_bind_group(2, light_bind_group, &[]);
        for mesh in &self.meshes {
            let Some(material) = self.materials.get(mesh.material) else {
                continue;
            };
            render_pass.set_bind_group(0, &material.bind_group, &[]);
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_vertex_buffer(1, mesh.instance_buffer.slice(..));
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.num_elements, 0, 0..1);
        }
    }
}
