//! Render pipelines and the bind group layouts they expect.
//!
//! - `basic` holds the scene pipeline and the material layout
//! - `light` holds the hemispheric light uniform

pub mod basic;
pub mod light;
