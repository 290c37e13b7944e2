//! Loading scenes and raw files from the asset directory.

pub mod scene_import;

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::data_structures::scene::Scene;

/// Asynchronous source of scenes. Loading is single-shot; callers decide what
/// a failure means.
pub trait AssetLoader {
    fn load(&self, file_name: &str) -> impl Future<Output = anyhow::Result<Scene>>;
}

/// Loads `.glb`/`.gltf` files relative to an asset root.
#[derive(Clone, Debug)]
pub struct GltfLoader {
    root: PathBuf,
}

impl GltfLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetLoader for GltfLoader {
    async fn load(&self, file_name: &str) -> anyhow::Result<Scene> {
        let path = self.root.join(file_name);
        let bytes = load_binary(&path).await?;
        let base = path.parent().unwrap_or(&self.root);
        let scene = scene_import::import_scene(&bytes, base)
            .await
            .with_context(|| format!("Cannot import {}", path.display()))?;
        log::info!(
            "Loaded {} with {} nodes and {} animation groups",
            path.display(),
            scene.nodes().len(),
            scene.animation_groups().len()
        );
        Ok(scene)
    }
}

#[cfg(target_arch = "wasm32")]
fn format_url(path: &Path) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("No window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow::anyhow!("No location origin"))?;
    let base = reqwest::Url::parse(&format!("{}/", origin))?;
    Ok(base.join(&path.to_string_lossy())?)
}

pub async fn load_binary(path: &Path) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(path)?;
        reqwest::get(url).await?.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Cannot read {}", path.display()))?;

    Ok(data)
}
