//! Hash-based value noise.
//!
//! Lattice values come from an integer hash, so evaluation is a pure function of the
//! seed and the position and needs no RNG state.
use glam::Vec2;

/// Mix a base seed with a lattice coordinate.
pub fn seed_for_cell(base_seed: u64, ix: i32, iy: i32) -> u64 {
    let cx = ix as i64 as u64;
    let cy = iy as i64 as u64;
    let mixed =
        base_seed ^ cx.wrapping_mul(0x9E3779B97F4A7C15) ^ cy.wrapping_mul(0xBF58476D1CE4E5B9);
    mix_u64(mixed)
}

#[inline]
fn mix_u64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58476D1CE4E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}

/// Lattice value in `[-1, 1]`.
#[inline]
fn lattice(base_seed: u64, ix: i32, iy: i32) -> f32 {
    let h = seed_for_cell(base_seed, ix, iy) >> 40;
    (h as f32 / (1u64 << 24) as f32) * 2.0 - 1.0
}

#[inline]
fn smooth(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Smoothly interpolated value noise in `[-1, 1]`.
pub fn value_noise(base_seed: u64, p: Vec2) -> f32 {
    let cell = p.floor();
    let (ix, iy) = (cell.x as i32, cell.y as i32);
    let t = p - cell;
    let (sx, sy) = (smooth(t.x), smooth(t.y));

    let a = lattice(base_seed, ix, iy);
    let b = lattice(base_seed, ix + 1, iy);
    let c = lattice(base_seed, ix, iy + 1);
    let d = lattice(base_seed, ix + 1, iy + 1);

    let top = a + (b - a) * sx;
    let bottom = c + (d - c) * sx;
    top + (bottom - top) * sy
}

/// Fractal sum of `octaves` value-noise layers, normalised to `[-1, 1]`.
pub fn fbm(base_seed: u64, p: Vec2, octaves: u32, persistence: f32) -> f32 {
    let mut sum = 0.0;
    let mut norm = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    for octave in 0..octaves.max(1) {
        sum += amplitude * value_noise(base_seed.wrapping_add(octave as u64), p * frequency);
        norm += amplitude;
        amplitude *= persistence;
        frequency *= 2.0;
    }
    sum / norm
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_is_deterministic() {
        let p = Vec2::new(3.3, 0.3);
        assert_eq!(value_noise(7, p), value_noise(7, p));
        assert_eq!(fbm(7, p, 4, 0.5), fbm(7, p, 4, 0.5));
    }

    #[test]
    fn noise_stays_in_range() {
        for i in 0..200 {
            let p = Vec2::new(i as f32 * 0.37 - 20.0, i as f32 * 0.11);
            let v = fbm(11, p, 5, 0.6);
            assert!((-1.0..=1.0).contains(&v), "fbm({p}) = {v}");
        }
    }

    #[test]
    fn noise_matches_lattice_at_integer_points() {
        let v = value_noise(3, Vec2::new(2.0, -1.0));
        assert_eq!(v, lattice(3, 2, -1));
    }

    #[test]
    fn seed_changes_lattice() {
        assert_ne!(seed_for_cell(1, 0, 0), seed_for_cell(2, 0, 0));
    }
}
