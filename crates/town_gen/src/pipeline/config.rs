//! Pipeline configuration.
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::placement::PlacementConfig;
use crate::world::WorldSize;

/// Delay between the end of a draft pass and the start of its final pass.
pub const DEFAULT_FINAL_PASS_DELAY: Duration = Duration::from_millis(30);

/// Configuration for building towns.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Extents of the generated world.
    pub world_size: WorldSize,
    /// Time the final pass waits after the draft, giving newer requests a chance to
    /// supersede it.
    pub final_pass_delay: Duration,
    /// Building placement settings.
    pub placement: PlacementConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            world_size: WorldSize::default(),
            final_pass_delay: DEFAULT_FINAL_PASS_DELAY,
            placement: PlacementConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Creates a new [`PipelineConfig`] for the given world size.
    pub fn new(world_size: WorldSize) -> Self {
        Self {
            world_size,
            ..Default::default()
        }
    }

    /// Sets the final pass delay.
    pub fn with_final_pass_delay(mut self, final_pass_delay: Duration) -> Self {
        self.final_pass_delay = final_pass_delay;
        self
    }

    /// Sets the placement configuration.
    pub fn with_placement(mut self, placement: PlacementConfig) -> Self {
        self.placement = placement;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        let size = self.world_size;
        if !(size.x > 0.0 && size.y > 0.0 && size.x.is_finite() && size.y.is_finite()) {
            return Err(Error::InvalidConfig(
                "world_size must be > 0 in both horizontal components".into(),
            ));
        }
        if !(size.height_limit > 0.0 && size.height_limit.is_finite()) {
            return Err(Error::InvalidConfig("height_limit must be > 0".into()));
        }
        self.placement.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.final_pass_delay, Duration::from_millis(30));
    }

    #[test]
    fn rejects_degenerate_world() {
        assert!(PipelineConfig::new(WorldSize::new(0.0, 10.0, 1.0))
            .validate()
            .is_err());
        assert!(PipelineConfig::new(WorldSize::new(10.0, 10.0, f32::NAN))
            .validate()
            .is_err());
    }

    #[test]
    fn placement_errors_propagate() {
        let config = PipelineConfig::default()
            .with_placement(PlacementConfig::default().with_palette(Vec::new()));
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
}
