//! Shared house geometry.
//!
//! A unit cube whose top is split along its depth; the two vertices on the split line
//! are raised to form a gabled roof:
//!
//! ```text
//!  side      front
//!    +       +---+
//!   / \      |   |
//!  +   +     +---+
//!  |   |     |   |
//!  +---+     +---+
//! ```
use glam::Vec3;

/// Height the ridge vertices are raised above the top face.
pub const RIDGE_OFFSET: f32 = 0.25;

/// Triangle mesh every building instance is drawn with.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildingTemplate {
    pub positions: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl BuildingTemplate {
    /// Unit cube centred on the origin with a gabled roof.
    pub fn gabled_house() -> Self {
        let positions = vec![
            // bottom, back to front
            Vec3::new(-0.5, -0.5, -0.5),
            Vec3::new(0.5, -0.5, -0.5),
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.5, -0.5, 0.0),
            Vec3::new(-0.5, -0.5, 0.5),
            Vec3::new(0.5, -0.5, 0.5),
            // top, back to front; 8 and 9 form the ridge
            Vec3::new(-0.5, 0.5, -0.5),
            Vec3::new(0.5, 0.5, -0.5),
            Vec3::new(-0.5, 0.5 + RIDGE_OFFSET, 0.0),
            Vec3::new(0.5, 0.5 + RIDGE_OFFSET, 0.0),
            Vec3::new(-0.5, 0.5, 0.5),
            Vec3::new(0.5, 0.5, 0.5),
        ];

        let quads: [[u32; 4]; 10] = [
            [0, 1, 3, 2],
            [2, 3, 5, 4],
            [6, 8, 9, 7],
            [8, 10, 11, 9],
            [0, 2, 8, 6],
            [2, 4, 10, 8],
            [1, 7, 9, 3],
            [3, 9, 11, 5],
            [0, 6, 7, 1],
            [4, 5, 11, 10],
        ];
        let triangles = quads
            .iter()
            .flat_map(|&[a, b, c, d]| [[a, b, c], [a, c, d]])
            .collect();

        Self {
            positions,
            triangles,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

impl Default for BuildingTemplate {
    fn default() -> Self {
        Self::gabled_house()
    }
}
