//! box-scene
//!
//! Loads a glTF scene with an animated box, chains its open, fall and close
//! clips, and labels it with text, either drawn onto a textured plane that
//! rides along with the scene's anchor node or built as extruded letters.
//! Runs natively and in the browser through wgpu and winit.
//!
//! High-level modules
//! - `animation`: keyframe channels, animation groups and the clip sequencer
//! - `app`: the winit application that drives the engine
//! - `camera`: orbit camera, controller and uniforms for view/projection
//! - `config`: JSON scene configuration with defaults for every field
//! - `context`: GPU and window context, the [`engine::RenderBackend`] used on screen
//! - `data_structures`: the CPU scene, meshes, materials and textures
//! - `engine`: the service that loads, composes and animates the scene
//! - `error`: scene-level errors
//! - `pipelines`: the scene render pipeline and the light uniform
//! - `render`: GPU buffers mirroring the scene
//! - `resources`: asset loading and glTF import
//! - `text`: fitted texture text and extruded text
//!

pub mod animation;
pub mod app;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod engine;
pub mod error;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod text;

pub use app::run;
pub use config::SceneConfig;
pub use engine::{EngineService, RenderBackend};
pub use error::SceneError;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn run_web() -> Result<(), wasm_bindgen::JsValue> {
    run(SceneConfig::default()).map_err(|e| wasm_bindgen::JsValue::from_str(&format!("{:#}", e)))
}
