//! Flat water plane at the sea level.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::controls::ControlSet;
use crate::error::Result;
use crate::pipeline::stage::Stage;
use crate::product::Product;
use crate::stages::labels;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaterData {
    /// Water surface height in world units.
    pub level: f32,
    pub rivers: bool,
}

impl WaterData {
    /// Returns `true` if ground at `height` is above the water surface.
    pub fn is_land(&self, height: f32) -> bool {
        height > self.level
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct WaterStage;

impl Stage for WaterStage {
    fn label(&self) -> &str {
        labels::WATER
    }

    fn create(&self, controls: &ControlSet) -> Result<Option<Product>> {
        let c = &controls.controls;
        Ok(Some(
            WaterData {
                level: c.sea_level * controls.size.height_limit,
                rivers: c.rivers,
            }
            .into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::Controls;
    use crate::world::WorldSize;

    #[test]
    fn level_scales_with_height_limit() {
        let set = ControlSet::derive(Controls::default(), WorldSize::new(10.0, 10.0, 2.0));
        let Some(Product::Water(water)) = WaterStage.create(&set).unwrap() else {
            panic!("expected water");
        };
        assert!((water.level - 1.1).abs() < 1e-6);
        assert!(water.rivers);
        assert!(water.is_land(1.2));
        assert!(!water.is_land(1.1));
    }
}
