//! Jittered lattice of road intersections.
use glam::Vec2;
use mint::Vector2;
use rand::RngCore;

use crate::sampling::{clamp_to_domain, rand01, LatticeSampling};

/// Row-major grid of jittered points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lattice {
    pub cols: usize,
    pub rows: usize,
    pub points: Vec<Vec2>,
}

impl Lattice {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn at(&self, col: usize, row: usize) -> Option<Vec2> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.points.get(row * self.cols + col).copied()
    }

    /// Pairs of horizontally and vertically adjacent points, row by row; within a row the
    /// right neighbour comes before the upper one.
    pub fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.cols).flat_map(move |col| {
                let here = self.at(col, row);
                let right = self.at(col + 1, row);
                let up = self.at(col, row + 1);
                [right, up]
                    .into_iter()
                    .filter_map(move |n| Some((here?, n?)))
            })
        })
    }
}

/// Jittered lattice sampling.
#[derive(Debug, Clone)]
pub struct JitterLattice {
    /// Jitter amount in [0, 1], where 0 is cell centres and 1 is max jitter.
    pub jitter: f32,
    /// Cell size of the lattice.
    pub cell_size: f32,
}

impl JitterLattice {
    /// Create a new lattice sampler with the given jitter (0.0 to 1.0).
    pub fn new(jitter: f32, cell_size: f32) -> Self {
        Self {
            jitter: jitter.clamp(0.0, 1.0),
            cell_size,
        }
    }
}

impl LatticeSampling for JitterLattice {
    fn generate(&self, domain_extent: Vector2<f32>, rng: &mut dyn RngCore) -> Lattice {
        let extent = Vec2::from(domain_extent);
        if !(extent.x > 0.0 && extent.y > 0.0) {
            return Lattice::default();
        }

        let eff = if self.cell_size.is_finite() && self.cell_size > 0.0 {
            self.cell_size
        } else {
            (extent.min_element() / 10.0).max(1.0)
        };

        let cols = ((extent.x / eff).floor() as usize).max(1);
        let rows = ((extent.y / eff).floor() as usize).max(1);
        let cell = extent / Vec2::new(cols as f32, rows as f32);
        let jitter = self.jitter * cell * 0.5;

        let mut points = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                let centre = -extent * 0.5 + (Vec2::new(col as f32, row as f32) + 0.5) * cell;
                // Both draws happen even without jitter so the stream stays aligned.
                let offset = Vec2::new(rand01(rng) * 2.0 - 1.0, rand01(rng) * 2.0 - 1.0) * jitter;
                points.push(clamp_to_domain(centre + offset, extent));
            }
        }

        Lattice { cols, rows, points }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn new_clamps_jitter_value() {
        assert_eq!(JitterLattice::new(2.0, 1.0).jitter, 1.0);
    }

    #[test]
    fn lattice_without_jitter_sits_on_cell_centres() {
        let mut rng = StdRng::seed_from_u64(1);
        let lattice = JitterLattice::new(0.0, 2.0).generate(Vec2::new(4.0, 4.0).into(), &mut rng);

        assert_eq!((lattice.cols, lattice.rows), (2, 2));
        assert_eq!(lattice.at(0, 0), Some(Vec2::new(-1.0, -1.0)));
        assert_eq!(lattice.at(1, 1), Some(Vec2::new(1.0, 1.0)));
        assert_eq!(lattice.at(2, 0), None);
    }

    #[test]
    fn edges_connect_right_and_up_neighbours() {
        let mut rng = StdRng::seed_from_u64(1);
        let lattice = JitterLattice::new(0.0, 1.0).generate(Vec2::new(3.0, 2.0).into(), &mut rng);
        // 3×2 points: 2 horizontal edges per row, 3 vertical edges.
        assert_eq!(lattice.edges().count(), 2 * 2 + 3);
        let (a, b) = lattice.edges().next().unwrap();
        assert_eq!(a, Vec2::new(-1.0, -0.5));
        assert_eq!(b, Vec2::new(0.0, -0.5));
    }

    #[test]
    fn jittered_points_stay_in_their_cell_and_domain() {
        let mut rng = StdRng::seed_from_u64(9);
        let lattice = JitterLattice::new(1.0, 1.0).generate(Vec2::new(6.0, 6.0).into(), &mut rng);
        for row in 0..lattice.rows {
            for col in 0..lattice.cols {
                let p = lattice.at(col, row).unwrap();
                let centre = Vec2::new(col as f32 - 2.5, row as f32 - 2.5);
                assert!((p - centre).abs().max_element() <= 0.5 + 1e-6);
                assert!(p.x >= -3.0 && p.x < 3.0 && p.y >= -3.0 && p.y < 3.0);
            }
        }
    }

    #[test]
    fn same_seed_same_lattice() {
        let sampler = JitterLattice::new(0.7, 1.3);
        let a = sampler.generate(Vec2::new(10.0, 10.0).into(), &mut StdRng::seed_from_u64(5));
        let b = sampler.generate(Vec2::new(10.0, 10.0).into(), &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn non_positive_extent_yields_empty_lattice() {
        let mut rng = StdRng::seed_from_u64(42);
        let sampler = JitterLattice::new(0.0, 1.0);
        assert!(sampler.generate(Vec2::new(0.0, 5.0).into(), &mut rng).is_empty());
        assert!(sampler.generate(Vec2::new(5.0, -1.0).into(), &mut rng).is_empty());
    }
}
