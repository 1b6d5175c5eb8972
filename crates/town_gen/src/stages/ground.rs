//! Fractal-noise terrain.
use glam::Vec2;
use tracing::debug;

use crate::controls::ControlSet;
use crate::error::Result;
use crate::pipeline::stage::Stage;
use crate::product::Product;
use crate::stages::labels;
use crate::terrain::noise::fbm;
use crate::terrain::GridHeightField;

const GROUND_SEED: u64 = 0x6772_6f75_6e64;
const RIVER_SEED: u64 = 0x7269_7665_72;
const OCTAVES: u32 = 5;
const PERSISTENCE: f32 = 0.5;
/// Lattice cells per world unit at model scale 1.
const BASE_FREQUENCY: f32 = 0.1;
/// Seed units are spread this far apart in noise space.
const SEED_OFFSET: f32 = 10.0;
/// Mean terrain height as a fraction of the height limit.
const BASE_LEVEL: f32 = 0.6;
const MIN_AMPLITUDE: f32 = 0.15;
const RIVER_WIDTH: f32 = 0.06;
/// River beds sit this far below the sea level (fraction of the height limit).
const RIVER_DEPTH: f32 = 0.05;

#[derive(Clone, Debug)]
pub struct GroundData {
    /// Terrain heights in world units, `[0, height_limit]`.
    pub terrain: GridHeightField,
}

impl GroundData {
    pub fn new(terrain: GridHeightField) -> Self {
        Self { terrain }
    }
}

/// Height as a fraction of the height limit at world position `p`.
pub fn relative_height(controls: &ControlSet, p: Vec2) -> f32 {
    let c = &controls.controls;
    let q = controls.seed * SEED_OFFSET + p * (BASE_FREQUENCY / controls.model_scale);
    let amplitude = MIN_AMPLITUDE + 0.6 * c.terrain;
    let mut h = BASE_LEVEL + amplitude * fbm(GROUND_SEED, q, OCTAVES, PERSISTENCE);

    if c.rivers {
        let r = fbm(RIVER_SEED, q * 0.5, 2, PERSISTENCE).abs();
        let bed = c.sea_level - RIVER_DEPTH;
        let carve = (r / RIVER_WIDTH).min(1.0);
        h = h.min(bed + (h - bed) * carve);
    }
    h.clamp(0.0, 1.0)
}

/// The `ground` stage.
#[derive(Debug, Default, Clone, Copy)]
pub struct GroundStage;

impl Stage for GroundStage {
    fn label(&self) -> &str {
        labels::GROUND
    }

    fn create(&self, controls: &ControlSet) -> Result<Option<Product>> {
        let size = controls.size;
        let terrain = GridHeightField::from_fn(size, controls.dim, |p| {
            relative_height(controls, p) * size.height_limit
        });
        debug!(
            "Generated {}x{} terrain at model scale {}.",
            controls.dim.x, controls.dim.y, controls.model_scale
        );
        Ok(Some(GroundData::new(terrain).into()))
    }
}
