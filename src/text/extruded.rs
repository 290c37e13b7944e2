//! Text as solid letter geometry.
//!
//! Glyphs are rasterized onto a coarse grid and each horizontal run of covered
//! cells becomes one box, `letter-thickness` deep. The result is blocky but has
//! no triangulation failure modes on complex curves.

use std::collections::BTreeSet;

use crate::{
    config::{ExtrudedTextConfig, TextAnchor, parse_hex_colour_f32},
    data_structures::{
        instance::Instance,
        material::Material,
        mesh::MeshData,
        scene::{Node, NodeId, Scene},
    },
    error::SceneError,
    text::{TextRenderer, typeface::Typeface},
};

/// Raster pixels per letter height.
const CELLS_PER_LETTER: f32 = 24.0;

/// Glyph cells with coverage of at least one half, in pen coordinates
/// (x right, y down, baseline at y = 0).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CoverageMask {
    cells: BTreeSet<(i32, i32)>,
}

impl CoverageMask {
    pub fn rasterize(typeface: &dyn Typeface, text: &str, px: f32) -> Self {
        let mut cells = BTreeSet::new();
        typeface.draw(text, px, (0.0, 0.0), &mut |x, y, coverage| {
            if coverage >= 0.5 {
                cells.insert((x, y));
            }
        });
        Self { cells }
    }

    pub fn from_cells(cells: impl IntoIterator<Item = (i32, i32)>) -> Self {
        Self {
            cells: cells.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Maximal horizontal runs as `(row, first column, length)`.
    pub fn runs(&self) -> Vec<(i32, i32, i32)> {
        let mut runs: Vec<(i32, i32, i32)> = Vec::new();
        // ordered by (x, y), so walk row-major by swapping
        let row_major: BTreeSet<(i32, i32)> = self.cells.iter().map(|&(x, y)| (y, x)).collect();
        for (y, x) in row_major {
            match runs.last_mut() {
                Some((row, start, len)) if *row == y && *start + *len == x => *len += 1,
                _ => runs.push((y, x, 1)),
            }
        }
        runs
    }
}

/// Extrudes every run of `mask` into a box of `cell` × `cell` × `depth` per
/// cell. Pen y grows downwards, scene y grows upwards.
pub fn extrude(mask: &CoverageMask, cell: f32, depth: f32) -> MeshData {
    let mut mesh = MeshData::default();
    for (row, start, len) in mask.runs() {
        let min = [start as f32 * cell, -(row + 1) as f32 * cell, 0.0];
        let max = [(start + len) as f32 * cell, -row as f32 * cell, depth];
        mesh.push_cuboid(min, max);
    }
    mesh
}

/// Horizontal shift that puts the text's `anchor` on the node origin.
pub fn anchor_offset(anchor: TextAnchor, advance: f32) -> f32 {
    match anchor {
        TextAnchor::Left => 0.0,
        TextAnchor::Center => -advance / 2.0,
        TextAnchor::Right => -advance,
    }
}

pub struct ExtrudedText {
    config: ExtrudedTextConfig,
    typeface: Box<dyn Typeface>,
}

impl ExtrudedText {
    pub fn new(config: ExtrudedTextConfig, typeface: Box<dyn Typeface>) -> Self {
        Self { config, typeface }
    }

    pub fn build_mesh(&self) -> MeshData {
        let cfg = &self.config;
        let cell = cfg.letter_height * cfg.scale / CELLS_PER_LETTER;
        let depth = cfg.letter_thickness * cfg.scale;
        let mask = CoverageMask::rasterize(&*self.typeface, &cfg.content, CELLS_PER_LETTER);
        if mask.is_empty() {
            log::warn!("Text {:?} produced no glyph coverage", cfg.content);
        }
        let mut mesh = extrude(&mask, cell, depth);
        let advance = self.typeface.measure(&cfg.content, CELLS_PER_LETTER) * cell;
        // centre the slab on z like the letters' mid-plane
        mesh.translate([anchor_offset(cfg.anchor, advance), 0.0, -depth / 2.0]);
        mesh
    }

    fn material(&self) -> Result<Material, SceneError> {
        let cfg = &self.config;
        let colour = |channel: &Option<String>, fallback: &str| {
            parse_hex_colour_f32(channel.as_deref().unwrap_or(fallback))
        };
        let rgb = |c: [f32; 4]| [c[0], c[1], c[2]];
        let mut material = Material::new("text");
        material.base_colour = colour(&cfg.colors.diffuse, &cfg.color)?;
        material.specular = rgb(colour(&cfg.colors.specular, "#000000")?);
        material.ambient = rgb(colour(&cfg.colors.ambient, &cfg.color)?);
        material.emissive = rgb(colour(&cfg.colors.emissive, &cfg.color)?);
        Ok(material)
    }
}

impl TextRenderer for ExtrudedText {
    fn attach(&self, scene: &mut Scene) -> Result<NodeId, SceneError> {
        let material = scene.add_material(self.material()?);
        let mut node = Node::new("text")
            .with_mesh(self.build_mesh())
            .with_transform(Instance::from(cgmath::Vector3::from(self.config.position)));
        node.material = Some(material);
        let id = scene.add_node(node);
        log::info!("Attached extruded text {:?}", self.config.content);
        Ok(id)
    }
}
