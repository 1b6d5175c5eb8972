//! Road network data shared between the road stage and the placement engine.
use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A straight road piece between two horizontal world positions.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoadSegment {
    pub v1: Vec2,
    pub v2: Vec2,
}

impl RoadSegment {
    pub fn new(v1: Vec2, v2: Vec2) -> Self {
        Self { v1, v2 }
    }

    pub fn midpoint(&self) -> Vec2 {
        0.5 * (self.v1 + self.v2)
    }

    pub fn length(&self) -> f32 {
        self.v1.distance(self.v2)
    }
}

/// Ordered road segments plus how intact the network turned out.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoadNetwork {
    /// Segments in a stable, deterministic order.
    pub segments: Vec<RoadSegment>,
    /// Network integrity in `[0, 1]`; drives the building scale.
    pub integrity: f32,
}

impl RoadNetwork {
    pub fn new(segments: Vec<RoadSegment>, integrity: f32) -> Self {
        Self {
            segments,
            integrity: integrity.clamp(0.0, 1.0),
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Sum of all segment lengths.
    pub fn total_length(&self) -> f32 {
        self.segments.iter().map(RoadSegment::length).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrity_is_clamped() {
        assert_eq!(RoadNetwork::new(Vec::new(), 1.7).integrity, 1.0);
        assert_eq!(RoadNetwork::new(Vec::new(), -0.2).integrity, 0.0);
    }

    #[test]
    fn segment_helpers() {
        let s = RoadSegment::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0));
        assert_eq!(s.midpoint(), Vec2::new(5.0, 0.0));
        assert_eq!(s.length(), 10.0);
        let net = RoadNetwork::new(vec![s, s], 1.0);
        assert_eq!(net.total_length(), 20.0);
    }
}
