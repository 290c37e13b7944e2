//! Domain errors raised while composing the scene.
//!
//! IO, parsing and GPU setup failures travel as [`anyhow::Error`]; the cases
//! callers are expected to match on live here.

use std::fmt;

/// The kind of named object a lookup was looking for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Mesh,
    AnimationGroup,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Mesh => f.write_str("mesh"),
            ObjectKind::AnimationGroup => f.write_str("animation group"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("no {kind} named `{name}` in the scene")]
    MissingSceneObject { kind: ObjectKind, name: String },

    /// Zero measured width leaves no finite font size to fit.
    #[error("text {0:?} has zero measured width, no font size fits the texture")]
    DegenerateText(String),

    #[error("invalid colour `{0}`, expected #rrggbb or #rrggbbaa")]
    InvalidColour(String),

    #[error("font `{0}` could not be parsed")]
    InvalidFont(String),
}

impl SceneError {
    pub fn missing_mesh(name: &str) -> Self {
        Self::MissingSceneObject {
            kind: ObjectKind::Mesh,
            name: name.to_string(),
        }
    }

    pub fn missing_animation_group(name: &str) -> Self {
        Self::MissingSceneObject {
            kind: ObjectKind::AnimationGroup,
            name: name.to_string(),
        }
    }

    pub fn is_missing_object(&self) -> bool {
        matches!(self, Self::MissingSceneObject { .. })
    }
}
