//! Opens the box scene in a window.
//!
//! ```sh
//! cargo run --release -- --config scene.json
//! ```

use std::path::PathBuf;

use box_scene::config::{SceneConfig, TextMode};
use clap::Parser;

#[derive(Parser)]
#[command(version, about = "Plays the box open/fall/close animation with a text label")]
struct Cli {
    /// JSON scene configuration. Missing keys keep their defaults.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory the glTF asset and fonts are read from.
    #[arg(long, value_name = "DIR")]
    asset_root: Option<PathBuf>,

    /// Use extruded letter geometry instead of the texture plane.
    #[arg(long)]
    extruded: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SceneConfig::from_file(path)?,
        None => SceneConfig::default(),
    };
    if let Some(asset_root) = cli.asset_root {
        config.asset_root = asset_root;
    }
    if cli.extruded {
        config.text.mode = TextMode::Extruded;
    }

    box_scene::run(config)
}
