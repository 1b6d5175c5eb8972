//! Reference collaborator stages.
//!
//! Small deterministic stand-ins for terrain, water, shore, surrounding and road
//! synthesis, so that a full town can be built end to end. Each one only honours the
//! product interface the placement engine and the orchestrator rely on.
use crate::pipeline::stage::Stage;
use crate::placement::{BuildingStage, PlacementConfig};

pub mod ground;
pub mod roads;
pub mod shores;
pub mod surrounding;
pub mod water;

/// Stage labels, in pipeline order.
pub mod labels {
    pub const GROUND: &str = "ground";
    pub const WATER: &str = "water";
    pub const SHORES: &str = "shores";
    pub const SURROUNDING: &str = "surrounding";
    pub const ROADS: &str = "roads";
    pub const BUILDINGS: &str = "buildings";

    pub const ALL: [&str; 6] = [GROUND, WATER, SHORES, SURROUNDING, ROADS, BUILDINGS];
}

/// The standard pipeline with the default placement configuration.
pub fn default_stages() -> Vec<Box<dyn Stage>> {
    stages_with_placement(PlacementConfig::default())
}

/// The standard pipeline with a custom building stage configuration.
pub fn stages_with_placement(placement: PlacementConfig) -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(ground::GroundStage),
        Box::new(water::WaterStage),
        Box::new(shores::ShoreStage),
        Box::new(surrounding::SurroundingStage),
        Box::new(roads::RoadStage::default()),
        Box::new(BuildingStage::new(placement)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_order_matches_labels() {
        let stages = default_stages();
        let order: Vec<_> = stages.iter().map(|s| s.label()).collect();
        assert_eq!(order, labels::ALL);
    }

    #[test]
    fn dependencies_point_backwards() {
        let stages = default_stages();
        for (i, stage) in stages.iter().enumerate() {
            for dep in stage.dependencies() {
                let pos = labels::ALL.iter().position(|l| l == dep).unwrap();
                assert!(pos < i, "{} depends on later stage {}", stage.label(), dep);
            }
        }
    }
}
