//! Orbit camera, projection and the uniform that feeds them to the shaders.

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::config::CameraConfig;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const MIN_BETA: f32 = 0.01;
const MIN_RADIUS: f32 = 0.5;

/// A camera orbiting `target` on a sphere.
///
/// `alpha` is the longitudinal angle around Y, `beta` the angle from the +Y axis.
#[derive(Clone, Debug, PartialEq)]
pub struct ArcRotateCamera {
    pub alpha: f32,
    pub beta: f32,
    pub radius: f32,
    pub target: Point3<f32>,
}

impl ArcRotateCamera {
    /// The orbit that passes through `position` looking at `target`.
    pub fn looking_at(position: Point3<f32>, target: Point3<f32>) -> Self {
        let offset = position - target;
        let radius = offset.magnitude().max(MIN_RADIUS);
        let alpha = offset.z.atan2(offset.x);
        let beta = (offset.y / radius).clamp(-1.0, 1.0).acos();
        Self {
            alpha,
            beta: beta.clamp(MIN_BETA, std::f32::consts::PI - MIN_BETA),
            radius,
            target,
        }
    }

    pub fn position(&self) -> Point3<f32> {
        let (sa, ca) = self.alpha.sin_cos();
        let (sb, cb) = self.beta.sin_cos();
        self.target + Vector3::new(ca * sb, cb, sa * sb) * self.radius
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position(), self.target, Vector3::unit_y())
    }

    pub fn rotate(&mut self, d_alpha: f32, d_beta: f32) {
        self.alpha += d_alpha;
        self.beta = (self.beta + d_beta).clamp(MIN_BETA, std::f32::consts::PI - MIN_BETA);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.radius = (self.radius - delta).max(MIN_RADIUS);
    }
}

pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Drag with the left button to orbit, scroll to zoom.
#[derive(Debug)]
pub struct CameraController {
    rotate_sensitivity: f32,
    zoom_sensitivity: f32,
    dragging: bool,
    last_cursor: Option<(f64, f64)>,
}

impl CameraController {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            rotate_sensitivity: config.rotate_sensitivity,
            zoom_sensitivity: config.zoom_sensitivity,
            dragging: false,
            last_cursor: None,
        }
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent, camera: &mut ArcRotateCamera) {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.dragging = *state == ElementState::Pressed,
            WindowEvent::CursorMoved { position, .. } => {
                if let (true, Some((x, y))) = (self.dragging, self.last_cursor) {
                    let dx = (position.x - x) as f32;
                    let dy = (position.y - y) as f32;
                    camera.rotate(-dx * self.rotate_sensitivity, -dy * self.rotate_sensitivity);
                }
                self.last_cursor = Some((position.x, position.y));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 50.0,
                };
                camera.zoom(scroll * self.zoom_sensitivity);
            }
            _ => (),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &ArcRotateCamera, projection: &Projection) {
        self.view_position = camera.position().to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

pub struct CameraResources {
    pub camera: ArcRotateCamera,
    pub controller: CameraController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_reproduces_start_position() {
        let camera =
            ArcRotateCamera::looking_at(Point3::new(8.0, 5.0, -10.0), Point3::new(0.0, 0.0, 0.0));
        let p = camera.position();
        assert!((p - Point3::new(8.0, 5.0, -10.0)).magnitude() < 1e-4);
    }

    #[test]
    fn zoom_never_passes_target() {
        let mut camera =
            ArcRotateCamera::looking_at(Point3::new(0.0, 0.0, -2.0), Point3::new(0.0, 0.0, 0.0));
        camera.zoom(100.0);
        assert_eq!(camera.radius, MIN_RADIUS);
    }
}
