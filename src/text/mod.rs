//! Text labels in the scene.
//!
//! Two interchangeable ways of putting text into the scene exist:
//! - [`fitted::FittedTextPlane`] draws onto a dynamic texture on a flat plane,
//! - [`extruded::ExtrudedText`] builds letter geometry.
//!
//! The configuration picks one via [`TextMode`].

pub mod extruded;
pub mod fitted;
pub mod typeface;

use crate::{
    config::{SceneConfig, TextMode},
    data_structures::scene::{NodeId, Scene},
    error::SceneError,
};

pub use typeface::{RusttypeFace, Typeface};

pub trait TextRenderer {
    /// Adds the text to `scene` and returns the new node.
    fn attach(&self, scene: &mut Scene) -> Result<NodeId, SceneError>;
}

/// Builds the text renderer selected by `config.text.mode`.
pub fn text_renderer(config: &SceneConfig, typeface: Box<dyn Typeface>) -> Box<dyn TextRenderer> {
    match config.text.mode {
        TextMode::DynamicTexture => Box::new(fitted::FittedTextPlane::new(
            config.text.clone(),
            &config.anchor_mesh,
            typeface,
        )),
        TextMode::Extruded => Box::new(extruded::ExtrudedText::new(
            config.extruded.clone(),
            typeface,
        )),
    }
}
