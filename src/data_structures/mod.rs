//! Engine data structures: the CPU scene, its meshes and materials, and GPU textures.
//!
//! - `scene` is the node arena with parenting and name lookups
//! - `instance` holds per-node transforms and their GPU layout
//! - `mesh` contains vertex data and procedural geometry
//! - `material` describes surface colours and an optional diffuse image
//! - `dynamic_texture` is a CPU canvas text is drawn onto
//! - `texture` wraps GPU textures

pub mod dynamic_texture;
pub mod instance;
pub mod material;
pub mod mesh;
pub mod scene;
pub mod texture;
