use image::RgbaImage;

/// Surface description shared by scene nodes.
///
/// Colours are linear `0.0..=1.0`. `diffuse` multiplies `base_colour` when present.
#[derive(Clone, Debug)]
pub struct Material {
    pub name: String,
    pub base_colour: [f32; 4],
    pub specular: [f32; 3],
    pub ambient: [f32; 3],
    pub emissive: [f32; 3],
    pub diffuse: Option<RgbaImage>,
}

impl Material {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            base_colour: [1.0; 4],
            specular: [0.0; 3],
            ambient: [0.0; 3],
            emissive: [0.0; 3],
            diffuse: None,
        }
    }

    pub fn with_diffuse(mut self, image: RgbaImage) -> Self {
        self.diffuse = Some(image);
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new("default")
    }
}
