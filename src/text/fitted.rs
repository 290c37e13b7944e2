//! A text label drawn onto a plane, sized so the string spans the texture width.

use crate::{
    config::{TextConfig, parse_hex_colour},
    data_structures::{
        dynamic_texture::DynamicTexture,
        material::Material,
        mesh::MeshData,
        scene::{Node, NodeId, Scene},
    },
    error::SceneError,
    text::{TextRenderer, typeface::Typeface},
};

/// Largest font size at which text measuring `measured_width` pixels at
/// `reference_size` still fits into `texture_width`.
///
/// Text width grows linearly with font size, so one measurement at any size
/// gives the width-per-pixel ratio. Returns `None` when the text has no width.
pub fn fit_font_size(texture_width: f32, measured_width: f32, reference_size: f32) -> Option<f32> {
    let ratio = measured_width / reference_size;
    if !ratio.is_finite() || ratio <= 0.0 {
        return None;
    }
    Some((texture_width / ratio).floor())
}

/// Pixel size of a texture covering `extent` scene units.
pub fn texture_extent(extent: f32, scale: f32) -> u32 {
    (extent * scale).round().max(1.0) as u32
}

pub struct FittedTextPlane {
    config: TextConfig,
    anchor: String,
    typeface: Box<dyn Typeface>,
}

impl FittedTextPlane {
    pub fn new(config: TextConfig, anchor: &str, typeface: Box<dyn Typeface>) -> Self {
        Self {
            config,
            anchor: anchor.to_string(),
            typeface,
        }
    }

    /// Renders the label into a fresh texture.
    pub fn render_texture(&self) -> Result<DynamicTexture, SceneError> {
        let cfg = &self.config;
        let width = texture_extent(cfg.plane_width, cfg.texture_scale);
        let height = texture_extent(cfg.plane_height, cfg.texture_scale);
        let mut texture = DynamicTexture::new("DynamicTexture", width, height);

        let measured = texture.measure_text(&*self.typeface, &cfg.content, cfg.reference_size);
        let font_size = fit_font_size(width as f32, measured, cfg.reference_size)
            .ok_or_else(|| SceneError::DegenerateText(cfg.content.clone()))?;
        log::debug!(
            "Fitting {:?} in {}x{} px: {} px {}",
            cfg.content,
            width,
            height,
            font_size,
            self.typeface.family()
        );

        let fill = parse_hex_colour(&cfg.fill)?;
        let background = parse_hex_colour(&cfg.background)?;
        texture.draw_text(
            &*self.typeface,
            &cfg.content,
            None,
            None,
            font_size,
            fill,
            Some(background),
            cfg.invert_y,
        );
        Ok(texture)
    }
}

impl TextRenderer for FittedTextPlane {
    fn attach(&self, scene: &mut Scene) -> Result<NodeId, SceneError> {
        let anchor = scene.mesh_by_name(&self.anchor)?;
        let texture = self.render_texture()?;

        let material = scene.add_material(Material::new("mat").with_diffuse(texture.to_image()));
        let mut plane = Node::new("plane")
            .with_mesh(MeshData::plane(self.config.plane_width, self.config.plane_height));
        plane.material = Some(material);
        let plane = scene.add_node(plane);

        let mut position = scene.world(anchor)?.position;
        position.y += self.config.anchor_offset;
        scene.set_world_position(plane, position)?;
        scene.set_parent(plane, Some(anchor))?;

        log::info!(
            "Attached text plane at {:?} to {}",
            scene.world(plane)?.position,
            self.anchor
        );
        Ok(plane)
    }
}
