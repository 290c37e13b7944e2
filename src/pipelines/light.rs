use wgpu::util::DeviceExt;

use crate::config::{LightConfig, parse_hex_colour_f32};

/// A hemispheric light: sky colour from `direction`, ground colour from the opposite side.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    direction: [f32; 3],
    intensity: f32,
    sky_colour: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: u32,
    ground_colour: [f32; 3],
    _padding2: u32,
    ambient: [f32; 3],
    _padding3: u32,
}

impl LightUniform {
    pub fn from_config(config: &LightConfig) -> anyhow::Result<Self> {
        let ground = parse_hex_colour_f32(&config.ground_colour)?;
        let ambient = parse_hex_colour_f32(&config.ambient)?;
        Ok(Self {
            direction: config.direction,
            intensity: config.intensity,
            sky_colour: [1.0, 1.0, 1.0],
            _padding: 0,
            ground_colour: [ground[0], ground[1], ground[2]],
            _padding2: 0,
            ambient: [ambient[0], ambient[1], ambient[2]],
            _padding3: 0,
        })
    }
}

pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl LightResources {
    pub fn new(
        uniform: LightUniform,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("light_bind_group"),
        });
        Self {
            uniform,
            buffer,
            bind_group,
        }
    }
}
