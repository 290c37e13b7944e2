//! Text measurement and glyph rasterization.

use std::path::Path;

use rusttype::{Font, Scale, point};

use crate::{error::SceneError, resources::load_binary};

/// A font that can measure and rasterize a single line of text.
pub trait Typeface {
    fn family(&self) -> &str;

    /// Advance width of `text` in pixels at `px`.
    fn measure(&self, text: &str, px: f32) -> f32;

    /// Rasterizes `text` with its baseline starting at `origin`, calling
    /// `plot(x, y, coverage)` for every touched pixel.
    fn draw(&self, text: &str, px: f32, origin: (f32, f32), plot: &mut dyn FnMut(i32, i32, f32));
}

pub struct RusttypeFace {
    family: String,
    font: Font<'static>,
}

impl RusttypeFace {
    pub fn from_bytes(family: &str, bytes: Vec<u8>) -> Result<Self, SceneError> {
        let font =
            Font::try_from_vec(bytes).ok_or_else(|| SceneError::InvalidFont(family.to_string()))?;
        Ok(Self {
            family: family.to_string(),
            font,
        })
    }

    /// Loads `<asset_root>/fonts/<family>.ttf`.
    pub async fn load(asset_root: &Path, family: &str) -> anyhow::Result<Self> {
        let path = asset_root.join("fonts").join(format!("{}.ttf", family));
        let bytes = load_binary(&path).await?;
        log::info!("Loaded font {} from {}", family, path.display());
        Ok(Self::from_bytes(family, bytes)?)
    }
}

impl Typeface for RusttypeFace {
    fn family(&self) -> &str {
        &self.family
    }

    fn measure(&self, text: &str, px: f32) -> f32 {
        self.font
            .layout(text, Scale::uniform(px), point(0.0, 0.0))
            .last()
            .map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    fn draw(&self, text: &str, px: f32, origin: (f32, f32), plot: &mut dyn FnMut(i32, i32, f32)) {
        let glyphs = self
            .font
            .layout(text, Scale::uniform(px), point(origin.0, origin.1));
        for glyph in glyphs {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|x, y, coverage| {
                    plot(bb.min.x + x as i32, bb.min.y + y as i32, coverage);
                });
            }
        }
    }
}
