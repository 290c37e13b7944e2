//! A CPU raster that can be drawn on with text and later used as a diffuse map.

use image::{Rgba, RgbaImage};

use crate::text::typeface::Typeface;

#[derive(Clone, Debug)]
pub struct DynamicTexture {
    pub name: String,
    canvas: RgbaImage,
    invert_y: bool,
}

impl DynamicTexture {
    /// A transparent texture of `width` × `height` pixels.
    pub fn new(name: &str, width: u32, height: u32) -> Self {
        Self {
            name: name.to_string(),
            canvas: RgbaImage::new(width.max(1), height.max(1)),
            invert_y: true,
        }
    }

    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    pub fn measure_text(&self, typeface: &dyn Typeface, text: &str, px: f32) -> f32 {
        typeface.measure(text, px)
    }

    pub fn clear(&mut self, colour: [u8; 4]) {
        self.canvas.pixels_mut().for_each(|p| *p = Rgba(colour));
    }

    /// Draws one line of text.
    ///
    /// A missing `x` centres the text horizontally and a missing `y` places the
    /// baseline slightly below the vertical middle. `background` clears the whole
    /// canvas first. With `invert_y` unset the uploaded image is flipped
    /// vertically.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_text(
        &mut self,
        typeface: &dyn Typeface,
        text: &str,
        x: Option<f32>,
        y: Option<f32>,
        px: f32,
        fill: [u8; 4],
        background: Option<[u8; 4]>,
        invert_y: bool,
    ) {
        if let Some(colour) = background {
            self.clear(colour);
        }
        let (width, height) = (self.width() as f32, self.height() as f32);
        let x = x.unwrap_or_else(|| (width - typeface.measure(text, px)) / 2.0);
        let y = y.unwrap_or(height / 2.0 + px / 3.65);
        self.invert_y = invert_y;

        let canvas = &mut self.canvas;
        typeface.draw(text, px, (x, y), &mut |px_x, px_y, coverage| {
            if px_x < 0 || px_y < 0 {
                return;
            }
            let Some(pixel) = canvas.get_pixel_mut_checked(px_x as u32, px_y as u32) else {
                return;
            };
            let coverage = coverage.clamp(0.0, 1.0);
            for (dst, src) in pixel.0.iter_mut().zip(fill) {
                *dst = (*dst as f32 * (1.0 - coverage) + src as f32 * coverage).round() as u8;
            }
        });
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.canvas.get_pixel(x, y).0
    }

    /// The image as it should be uploaded, rows top to bottom.
    pub fn to_image(&self) -> RgbaImage {
        if self.invert_y {
            self.canvas.clone()
        } else {
            image::imageops::flip_vertical(&self.canvas)
        }
    }
}
