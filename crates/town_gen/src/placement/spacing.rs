//! Minimum-distance filter for accepted building sites.
use std::collections::HashMap;

use glam::Vec2;

/// Uniform hash grid of accepted sites with a cell size equal to the spacing, so a
/// conflicting site can only live in the 3×3 neighbourhood of the query cell.
#[derive(Debug)]
pub(crate) struct SpacingGrid {
    cell_size: f32,
    radius_squared: f32,
    cells: HashMap<(i32, i32), Vec<Vec2>>,
}

impl SpacingGrid {
    pub(crate) fn new(min_spacing: f32) -> Self {
        debug_assert!(min_spacing > 0.0);
        Self {
            cell_size: min_spacing,
            radius_squared: min_spacing * min_spacing,
            cells: HashMap::new(),
        }
    }

    #[inline]
    fn cell_of(&self, p: Vec2) -> (i32, i32) {
        let c = (p / self.cell_size).floor();
        (c.x as i32, c.y as i32)
    }

    fn is_clear(&self, p: Vec2) -> bool {
        let (cx, cy) = self.cell_of(p);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if let Some(points) = self.cells.get(&(cx + dx, cy + dy)) {
                    if points
                        .iter()
                        .any(|q| q.distance_squared(p) < self.radius_squared)
                    {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Record `p` if no recorded site is closer than the spacing. Returns whether it was
    /// recorded.
    pub(crate) fn try_insert(&mut self, p: Vec2) -> bool {
        if !self.is_clear(p) {
            return false;
        }
        let cell = self.cell_of(p);
        self.cells.entry(cell).or_default().push(p);
        true
    }
}
