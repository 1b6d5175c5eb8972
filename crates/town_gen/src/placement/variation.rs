//! Deterministic per-building variation.
//!
//! Variation depends only on the index of a building within one placement call, so two
//! identical calls produce identical materials and proportions.
use glam::Vec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Multiplier applied to the stretched axis, relative to the other two.
pub const SCALE_AXIS_FACTOR: f32 = 1.5;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScaleAxis {
    X,
    Y,
    Z,
}

/// Axis stretched for buildings `4k..4k+3` cycles through this sequence.
pub const AXIS_SEQUENCE: [ScaleAxis; 3] = [ScaleAxis::X, ScaleAxis::Y, ScaleAxis::Z];

/// A surface material of the building palette.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildingMaterial {
    /// `0xRRGGBB` colour.
    pub color: u32,
    pub shininess: f32,
}

impl BuildingMaterial {
    pub const fn matte(color: u32) -> Self {
        Self {
            color,
            shininess: 0.0,
        }
    }

    /// Colour as `[r, g, b]` bytes.
    pub fn rgb(&self) -> [u8; 3] {
        [
            ((self.color >> 16) & 0xff) as u8,
            ((self.color >> 8) & 0xff) as u8,
            (self.color & 0xff) as u8,
        ]
    }
}

/// White plaster and brown timber.
pub const DEFAULT_PALETTE: [BuildingMaterial; 2] = [
    BuildingMaterial::matte(0xffffff),
    BuildingMaterial::matte(0x855E42),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Variation {
    pub material_index: usize,
    pub scale_axis: ScaleAxis,
}

impl Variation {
    /// Variation of the `n`-th building emitted by a placement call.
    pub fn for_building(n: usize, palette_size: usize) -> Self {
        Self {
            material_index: n % palette_size.max(1),
            scale_axis: AXIS_SEQUENCE[(n >> 2) % AXIS_SEQUENCE.len()],
        }
    }

    /// Uniform `building_scale` with the chosen axis stretched.
    pub fn scale(&self, building_scale: f32) -> Vec3 {
        let mut scale = Vec3::splat(building_scale);
        match self.scale_axis {
            ScaleAxis::X => scale.x *= SCALE_AXIS_FACTOR,
            ScaleAxis::Y => scale.y *= SCALE_AXIS_FACTOR,
            ScaleAxis::Z => scale.z *= SCALE_AXIS_FACTOR,
        }
        scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_eight_buildings_cycle_materials_and_axes() {
        let variations: Vec<_> = (0..8).map(|n| Variation::for_building(n, 2)).collect();
        let materials: Vec<_> = variations.iter().map(|v| v.material_index).collect();
        let axes: Vec<_> = variations.iter().map(|v| v.scale_axis).collect();
        assert_eq!(materials, vec![0, 1, 0, 1, 0, 1, 0, 1]);
        use ScaleAxis::*;
        assert_eq!(axes, vec![X, X, X, X, Y, Y, Y, Y]);
    }

    #[test]
    fn axes_wrap_after_z() {
        assert_eq!(Variation::for_building(8, 2).scale_axis, ScaleAxis::Z);
        assert_eq!(Variation::for_building(12, 2).scale_axis, ScaleAxis::X);
    }

    #[test]
    fn scale_stretches_one_axis() {
        let v = Variation::for_building(4, 2);
        assert_eq!(v.scale(2.0), Vec3::new(2.0, 3.0, 2.0));
    }

    #[test]
    fn empty_palette_does_not_divide_by_zero() {
        assert_eq!(Variation::for_building(5, 0).material_index, 0);
    }

    #[test]
    fn palette_colours_unpack() {
        assert_eq!(DEFAULT_PALETTE[1].rgb(), [0x85, 0x5E, 0x42]);
    }
}
