//! Seeded candidate layouts for the road network.
//!
//! Road intersections are laid out on a jittered lattice so that every intersection
//! knows its right and upper neighbour; the road stage connects those pairs.
use glam::Vec2;
use mint::Vector2;
use rand::RngCore;

pub mod jitter_grid;

pub use jitter_grid::{JitterLattice, Lattice};

/// Trait for lattice-shaped position sampling.
pub trait LatticeSampling: Send + Sync {
    fn generate(&self, domain_extent: Vector2<f32>, rng: &mut dyn RngCore) -> Lattice;
}

/// Generate a random float in the range [0, 1).
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() as f32) / ((u32::MAX as f32) + 1.0)
}

/// Largest float strictly below `val`, used to keep points inside a half-open domain.
#[inline]
pub(crate) fn next_down(val: f32) -> f32 {
    if val.is_nan() || val == f32::NEG_INFINITY {
        return val;
    }
    if val == f32::INFINITY {
        return f32::MAX;
    }
    if val == 0.0 {
        return -f32::MIN_POSITIVE;
    }
    let bits = val.to_bits();
    if val > 0.0 {
        f32::from_bits(bits - 1)
    } else {
        f32::from_bits(bits + 1)
    }
}

/// Clamp `p` into the centred domain `[-extent/2, extent/2)`.
#[inline]
pub(crate) fn clamp_to_domain(p: Vec2, extent: Vec2) -> Vec2 {
    let half = extent * 0.5;
    Vec2::new(
        p.x.clamp(-half.x, next_down(half.x)),
        p.y.clamp(-half.y, next_down(half.y)),
    )
}
