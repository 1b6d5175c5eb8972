//! Height fields queried by the placement engine and the road synthesis.
//!
//! Lookups are fallible: a point outside the terrain extents yields [`OutOfDomain`]
//! instead of a value, and callers decide whether that is fatal.
use glam::Vec2;
use thiserror::Error;

use crate::world::WorldSize;

pub mod grid;
pub mod noise;

pub use grid::GridHeightField;

/// Returned when a height is requested outside the terrain extents.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[error("position ({x}, {y}) lies outside the terrain")]
pub struct OutOfDomain {
    pub x: f32,
    pub y: f32,
}

impl OutOfDomain {
    pub fn at(p: Vec2) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// Queryable terrain elevation surface.
pub trait HeightField: Send + Sync {
    /// Elevation in world units at the horizontal position `p`.
    fn height_at(&self, p: Vec2) -> Result<f32, OutOfDomain>;

    /// Extents of the field, including its vertical scale.
    fn size(&self) -> WorldSize;

    /// World height that buildable flat ground has been levelled to.
    fn flat_height(&self) -> f32;
}
