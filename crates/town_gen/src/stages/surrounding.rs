//! Padding tiles that extend the water plane around the generated world.
use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::controls::ControlSet;
use crate::error::Result;
use crate::pipeline::stage::Stage;
use crate::product::Product;
use crate::stages::labels;
use crate::stages::water::WaterData;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaddingTile {
    pub min: Vec2,
    pub max: Vec2,
    pub height: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurroundingData {
    pub tiles: Vec<PaddingTile>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SurroundingStage;

impl Stage for SurroundingStage {
    fn label(&self) -> &str {
        labels::SURROUNDING
    }

    fn dependencies(&self) -> &[&'static str] {
        &[labels::WATER]
    }

    fn create(&self, controls: &ControlSet) -> Result<Option<Product>> {
        let water = controls.require::<WaterData>(self.label())?;
        let (min, max) = controls.size.bounds();
        let extent = max - min;

        let tiles = (-1..=1)
            .flat_map(|dy| (-1..=1).map(move |dx| (dx, dy)))
            .filter(|&offset| offset != (0, 0))
            .map(|(dx, dy)| {
                let shift = Vec2::new(dx as f32, dy as f32) * extent;
                PaddingTile {
                    min: min + shift,
                    max: max + shift,
                    height: water.level,
                }
            })
            .collect();

        Ok(Some(SurroundingData { tiles }.into()))
    }
}
