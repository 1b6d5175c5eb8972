//! Shore levelling.
//!
//! Picks the height buildable ground is levelled to, a little above the sea level, and
//! snaps every terrain vertex close to it onto exactly that height. Placement later
//! accepts sites whose height lies within `flat_epsilon` of the flat height.
use tracing::debug;

use crate::controls::ControlSet;
use crate::error::Result;
use crate::pipeline::stage::Stage;
use crate::product::Product;
use crate::stages::ground::GroundData;
use crate::stages::labels;
use crate::terrain::GridHeightField;

/// Share of the land above the sea level the `shore` control can lift the plateau by.
const SHORE_RISE: f32 = 0.25;
const BASE_EPSILON: f32 = 0.01;
const EPSILON_PER_FLAT: f32 = 0.05;
const BASE_SNAP: f32 = 0.05;
const SNAP_PER_FLAT: f32 = 0.25;

#[derive(Clone, Debug)]
pub struct ShoreData {
    /// Flat ground height as a fraction of the height limit.
    pub flat_height: f32,
    /// Flatness tolerance as a fraction of the height limit.
    pub flat_epsilon: f32,
    /// Terrain with the flat band levelled; its `flat_height()` is in world units.
    pub terrain: GridHeightField,
    /// Number of vertices snapped onto the flat height.
    pub flattened: usize,
}

impl ShoreData {
    pub fn new(
        flat_height: f32,
        flat_epsilon: f32,
        terrain: GridHeightField,
        flattened: usize,
    ) -> Self {
        Self {
            flat_height,
            flat_epsilon,
            terrain,
            flattened,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ShoreStage;

impl Stage for ShoreStage {
    fn label(&self) -> &str {
        labels::SHORES
    }

    fn dependencies(&self) -> &[&'static str] {
        &[labels::GROUND]
    }

    fn create(&self, controls: &ControlSet) -> Result<Option<Product>> {
        let ground = controls.require::<GroundData>(self.label())?;
        let c = &controls.controls;
        let height_limit = controls.size.height_limit;

        let flat_height = (c.sea_level + SHORE_RISE * c.shore * (1.0 - c.sea_level)).clamp(0.0, 1.0);
        let flat_epsilon = BASE_EPSILON + EPSILON_PER_FLAT * c.flat;
        let snap = (BASE_SNAP + SNAP_PER_FLAT * c.flat) * height_limit;
        let world_flat = flat_height * height_limit;

        let mut flattened = 0;
        let terrain = ground
            .terrain
            .map_heights(|h| {
                // NaN never compares within the band, so it is left as is.
                if (h - world_flat).abs() <= snap {
                    flattened += 1;
                    world_flat
                } else {
                    h
                }
            })
            .with_flat_height(world_flat);

        debug!(
            "Levelled {} vertices to flat height {}.",
            flattened, world_flat
        );
        Ok(Some(
            ShoreData::new(flat_height, flat_epsilon, terrain, flattened).into(),
        ))
    }
}
