//! Regular-grid height field.
use glam::{UVec2, Vec2};

use crate::error::{Error, Result};
use crate::terrain::{HeightField, OutOfDomain};
use crate::world::WorldSize;

/// Height field sampled on a `(segments.x + 1) × (segments.y + 1)` vertex grid spanning
/// the centred world extents. Lookups return the nearest vertex.
#[derive(Clone, Debug, PartialEq)]
pub struct GridHeightField {
    size: WorldSize,
    segments: UVec2,
    heights: Vec<f32>,
    flat_height: f32,
}

impl GridHeightField {
    /// Wrap existing row-major vertex heights.
    pub fn new(size: WorldSize, segments: UVec2, heights: Vec<f32>) -> Result<Self> {
        if segments.x == 0 || segments.y == 0 {
            return Err(Error::InvalidConfig("segments must be > 0".into()));
        }
        let expected = ((segments.x + 1) * (segments.y + 1)) as usize;
        if heights.len() != expected {
            return Err(Error::InvalidConfig(format!(
                "expected {expected} heights for {segments} segments, got {}",
                heights.len()
            )));
        }
        Ok(Self {
            size,
            segments,
            heights,
            flat_height: 0.0,
        })
    }

    /// Build a field by evaluating `f` at every vertex position.
    pub fn from_fn(size: WorldSize, segments: UVec2, mut f: impl FnMut(Vec2) -> f32) -> Self {
        let segments = segments.max(UVec2::ONE);
        let mut heights = Vec::with_capacity(((segments.x + 1) * (segments.y + 1)) as usize);
        let (min, _) = size.bounds();
        let step = size.extent() / segments.as_vec2();
        for iy in 0..=segments.y {
            for ix in 0..=segments.x {
                heights.push(f(min + Vec2::new(ix as f32, iy as f32) * step));
            }
        }
        Self {
            size,
            segments,
            heights,
            flat_height: 0.0,
        }
    }

    pub fn with_flat_height(mut self, flat_height: f32) -> Self {
        self.flat_height = flat_height;
        self
    }

    pub fn segments(&self) -> UVec2 {
        self.segments
    }

    /// Row-major vertex heights.
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// World position of vertex `(ix, iy)`.
    pub fn vertex_position(&self, ix: u32, iy: u32) -> Vec2 {
        let (min, _) = self.size.bounds();
        min + Vec2::new(ix as f32, iy as f32) * (self.size.extent() / self.segments.as_vec2())
    }

    /// Copy of this field with every vertex height passed through `f`.
    pub fn map_heights(&self, mut f: impl FnMut(f32) -> f32) -> Self {
        Self {
            heights: self.heights.iter().map(|&h| f(h)).collect(),
            ..self.clone()
        }
    }

    fn nearest_vertex(&self, p: Vec2) -> std::result::Result<usize, OutOfDomain> {
        if !self.size.contains(p) {
            return Err(OutOfDomain::at(p));
        }
        let (min, _) = self.size.bounds();
        let uv = (p - min) / self.size.extent();
        let ix = ((uv.x * self.segments.x as f32).round() as u32).min(self.segments.x);
        let iy = ((uv.y * self.segments.y as f32).round() as u32).min(self.segments.y);
        Ok((iy * (self.segments.x + 1) + ix) as usize)
    }
}

impl HeightField for GridHeightField {
    fn height_at(&self, p: Vec2) -> std::result::Result<f32, OutOfDomain> {
        let idx = self.nearest_vertex(p)?;
        Ok(self.heights[idx])
    }

    fn size(&self) -> WorldSize {
        self.size
    }

    fn flat_height(&self) -> f32 {
        self.flat_height
    }
}
