//! Road synthesis on a jittered lattice.
//!
//! Intersections come from [`JitterLattice`] seeded from the control seed. Every pair of
//! right/up neighbours is a candidate segment; a candidate on land survives when a
//! seeded draw falls under the cityness-driven keep rate.
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::controls::ControlSet;
use crate::error::Result;
use crate::pipeline::stage::Stage;
use crate::product::Product;
use crate::roads::{RoadNetwork, RoadSegment};
use crate::sampling::{rand01, JitterLattice, LatticeSampling};
use crate::stages::labels;
use crate::stages::shores::ShoreData;
use crate::stages::water::WaterData;
use crate::terrain::HeightField;

const ROAD_SEED: u64 = 0x726f_6164_73;

/// Road synthesis parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct RoadConfig {
    /// Lattice jitter in `[0, 1]`.
    pub jitter: f32,
    /// Lattice cell size per unit of model scale.
    pub cell_per_model_scale: f32,
    /// Keep rate at cityness 0.
    pub base_keep: f32,
    /// Keep rate added at cityness 1.
    pub keep_per_cityness: f32,
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            jitter: 0.6,
            cell_per_model_scale: 1.6,
            base_keep: 0.2,
            keep_per_cityness: 0.8,
        }
    }
}

impl RoadConfig {
    pub fn keep_rate(&self, cityness: f32) -> f32 {
        (self.base_keep + self.keep_per_cityness * cityness).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Default, Clone)]
pub struct RoadStage {
    pub config: RoadConfig,
}

fn rng_for(controls: &ControlSet) -> StdRng {
    let seed = ((controls.seed.x.to_bits() as u64) << 32) | controls.seed.y.to_bits() as u64;
    StdRng::seed_from_u64(ROAD_SEED ^ seed)
}

impl Stage for RoadStage {
    fn label(&self) -> &str {
        labels::ROADS
    }

    fn dependencies(&self) -> &[&'static str] {
        &[labels::WATER, labels::SHORES]
    }

    fn create(&self, controls: &ControlSet) -> Result<Option<Product>> {
        let water = controls.require::<WaterData>(self.label())?;
        let shores = controls.require::<ShoreData>(self.label())?;
        let terrain = &shores.terrain;

        let cell_size = self.config.cell_per_model_scale * controls.model_scale;
        let keep_rate = self.config.keep_rate(controls.controls.cityness);
        let mut rng = rng_for(controls);
        let lattice = JitterLattice::new(self.config.jitter, cell_size)
            .generate(controls.size.extent().into(), &mut rng);

        let on_land = |p: Vec2| terrain.height_at(p).is_ok_and(|h| water.is_land(h));

        let mut candidates = 0usize;
        let mut segments = Vec::new();
        for (v1, v2) in lattice.edges() {
            // One draw per lattice edge keeps the stream independent of the terrain.
            let draw = rand01(&mut rng);
            if !(on_land(v1) && on_land(v2)) {
                continue;
            }
            candidates += 1;
            if draw < keep_rate {
                segments.push(RoadSegment::new(v1, v2));
            }
        }

        let integrity = if candidates == 0 {
            warn!("No land for roads; the road network is empty.");
            0.0
        } else {
            segments.len() as f32 / candidates as f32
        };
        debug!(
            "Kept {} of {} road candidates (integrity {:.2}).",
            segments.len(),
            candidates,
            integrity
        );

        Ok(Some(RoadNetwork::new(segments, integrity).into()))
    }
}
