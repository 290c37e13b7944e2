//! Scene configuration.
//!
//! Every field has a default matching the packaged `box_open_close2.glb`
//! scene, so an empty JSON object (or no file at all) is a valid configuration.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::error::SceneError;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub asset_root: PathBuf,
    pub asset_file: String,
    pub clips: ClipNames,
    pub anchor_mesh: String,
    pub box_mesh: String,
    pub text: TextConfig,
    pub extruded: ExtrudedTextConfig,
    pub camera: CameraConfig,
    pub light: LightConfig,
    pub window_title: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            asset_file: "box_open_close2.glb".to_string(),
            clips: ClipNames::default(),
            anchor_mesh: "EMPTY".to_string(),
            box_mesh: "box".to_string(),
            text: TextConfig::default(),
            extruded: ExtrudedTextConfig::default(),
            camera: CameraConfig::default(),
            light: LightConfig::default(),
            window_title: "box-scene".to_string(),
        }
    }
}

impl SceneConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Malformed scene configuration")
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read configuration {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Font family of whichever text path is active.
    pub fn active_font_family(&self) -> &str {
        match self.text.mode {
            TextMode::DynamicTexture => &self.text.font_family,
            TextMode::Extruded => &self.extruded.font_family,
        }
    }
}

/// Names of the three clips chained by the sequencer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipNames {
    pub open: String,
    pub fall: String,
    pub close: String,
}

impl Default for ClipNames {
    fn default() -> Self {
        Self {
            open: "box_open".to_string(),
            fall: "empty_falling".to_string(),
            close: "box_close".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextMode {
    #[default]
    DynamicTexture,
    Extruded,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub mode: TextMode,
    pub content: String,
    pub font_family: String,
    pub plane_width: f32,
    pub plane_height: f32,
    /// Texture pixels per scene unit.
    pub texture_scale: f32,
    /// Any size works here, only the width/size ratio is used.
    pub reference_size: f32,
    pub fill: String,
    pub background: String,
    pub anchor_offset: f32,
    pub invert_y: bool,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            mode: TextMode::default(),
            content: "Hello! 👋".to_string(),
            font_family: "ComicSansMS".to_string(),
            plane_width: 1.5,
            plane_height: 1.2,
            texture_scale: 20.0,
            reference_size: 11.0,
            fill: "#000000".to_string(),
            background: "#ffffff".to_string(),
            anchor_offset: 0.5,
            invert_y: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAnchor {
    Left,
    #[default]
    Center,
    Right,
}

/// Per-channel overrides; a missing channel falls back to the text colour
/// (specular falls back to black).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialColours {
    pub diffuse: Option<String>,
    pub specular: Option<String>,
    pub ambient: Option<String>,
    pub emissive: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Position> for cgmath::Vector3<f32> {
    fn from(p: Position) -> Self {
        cgmath::Vector3::new(p.x, p.y, p.z)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExtrudedTextConfig {
    pub content: String,
    pub font_family: String,
    pub letter_height: f32,
    pub letter_thickness: f32,
    pub color: String,
    pub anchor: TextAnchor,
    pub colors: MaterialColours,
    pub position: Position,
    /// Scene units per letter unit.
    pub scale: f32,
}

impl Default for ExtrudedTextConfig {
    fn default() -> Self {
        Self {
            content: "Hello World".to_string(),
            font_family: "Arial".to_string(),
            letter_height: 30.0,
            letter_thickness: 12.0,
            color: "#1C3870".to_string(),
            anchor: TextAnchor::Center,
            colors: MaterialColours {
                diffuse: Some("#F0F0F0".to_string()),
                specular: Some("#000000".to_string()),
                ambient: Some("#F0F0F0".to_string()),
                emissive: Some("#ff00f0".to_string()),
            },
            position: Position {
                x: 0.0,
                y: 10.0,
                z: 0.0,
            },
            scale: 0.25,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub fovy_degrees: f32,
    pub rotate_sensitivity: f32,
    pub zoom_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [8.0, 5.0, -10.0],
            target: [0.0, 0.0, 0.0],
            fovy_degrees: 45.0,
            rotate_sensitivity: 0.005,
            zoom_sensitivity: 0.5,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub direction: [f32; 3],
    pub intensity: f32,
    pub ground_colour: String,
    pub ambient: String,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            direction: [0.0, 1.0, 0.0],
            intensity: 2.0,
            ground_colour: "#000000".to_string(),
            ambient: "#000000".to_string(),
        }
    }
}

/// Parses `#rrggbb` or `#rrggbbaa`.
pub fn parse_hex_colour(hex: &str) -> Result<[u8; 4], SceneError> {
    let invalid = || SceneError::InvalidColour(hex.to_string());
    let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
    if !matches!(digits.len(), 6 | 8) || !digits.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
    let alpha = if digits.len() == 8 { channel(6)? } else { 255 };
    Ok([channel(0)?, channel(2)?, channel(4)?, alpha])
}

/// Same as [`parse_hex_colour`] but normalized to `0.0..=1.0`.
pub fn parse_hex_colour_f32(hex: &str) -> Result<[f32; 4], SceneError> {
    let [r, g, b, a] = parse_hex_colour(hex)?;
    Ok([r, g, b, a].map(|c| c as f32 / 255.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rgb_and_rgba() {
        assert_eq!(parse_hex_colour("#1C3870").unwrap(), [0x1c, 0x38, 0x70, 255]);
        assert_eq!(parse_hex_colour("#ff00f080").unwrap(), [255, 0, 240, 128]);
    }

    #[test]
    fn rejects_malformed_colours() {
        assert!(parse_hex_colour("ffffff").is_err());
        assert!(parse_hex_colour("#fff").is_err());
        assert!(parse_hex_colour("#gg0000").is_err());
    }
}
