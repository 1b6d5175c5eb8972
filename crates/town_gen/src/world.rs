//! World context owned by the orchestrator.
//!
//! A [`World`] bundles the fixed world extents with the [`SceneCollection`] that stage
//! products are appended to. It is created once and handed to the orchestrator, which
//! is the only writer of its scene during a build.
use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::scene::SceneCollection;

/// Names of the engine-owned objects that precede every stage sub-scene.
pub const PERSISTENT_OBJECTS: [&str; 3] = ["lights", "camera", "persistent"];

/// Extents of the generated world in world units.
///
/// The horizontal domain is centred on the origin and spans `[-x/2, x/2] × [-y/2, y/2]`.
/// `height_limit` is the vertical scale factor; heights published by stages are in
/// `[0, height_limit]` and relative heights (flat band, sea level) are fractions of it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldSize {
    pub x: f32,
    pub y: f32,
    pub height_limit: f32,
}

impl Default for WorldSize {
    fn default() -> Self {
        Self {
            x: 10.0,
            y: 10.0,
            height_limit: 1.0,
        }
    }
}

impl WorldSize {
    pub fn new(x: f32, y: f32, height_limit: f32) -> Self {
        Self { x, y, height_limit }
    }

    /// Horizontal extent as a vector.
    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Min and max corners of the centred horizontal domain.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let half = self.extent() / 2.0;
        (-half, half)
    }

    /// Returns `true` if `p` lies inside the domain (edges included).
    pub fn contains(&self, p: Vec2) -> bool {
        let (min, max) = self.bounds();
        p.is_finite() && p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
    }
}

/// Explicit world context: extents plus the scene the orchestrator renders into.
#[derive(Debug)]
pub struct World {
    size: WorldSize,
    scene: SceneCollection,
}

impl World {
    /// Create a world with the engine's persistent objects already in the scene.
    pub fn new(size: WorldSize) -> Self {
        Self {
            size,
            scene: SceneCollection::with_persistent(PERSISTENT_OBJECTS),
        }
    }

    pub fn size(&self) -> WorldSize {
        self.size
    }

    /// Read-only access for the render boundary.
    pub fn scene(&self) -> &SceneCollection {
        &self.scene
    }

    pub(crate) fn scene_mut(&mut self) -> &mut SceneCollection {
        &mut self.scene
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldSize::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_centred() {
        let size = WorldSize::new(10.0, 6.0, 1.0);
        let (min, max) = size.bounds();
        assert_eq!(min, Vec2::new(-5.0, -3.0));
        assert_eq!(max, Vec2::new(5.0, 3.0));
    }

    #[test]
    fn contains_includes_edges_and_rejects_nan() {
        let size = WorldSize::new(2.0, 2.0, 1.0);
        assert!(size.contains(Vec2::new(1.0, -1.0)));
        assert!(!size.contains(Vec2::new(1.01, 0.0)));
        assert!(!size.contains(Vec2::new(f32::NAN, 0.0)));
    }

    #[test]
    fn new_world_holds_only_persistent_objects() {
        let world = World::default();
        assert_eq!(world.scene().persistent_len(), PERSISTENT_OBJECTS.len());
        assert_eq!(world.scene().sub_scenes().count(), 0);
    }
}
