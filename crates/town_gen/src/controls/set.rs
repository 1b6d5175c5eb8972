//! The control set passed through every stage of one pass.
use std::sync::Arc;

use glam::{UVec2, Vec2};

use crate::controls::Controls;
use crate::error::{Error, Result};
use crate::product::{Product, ProductKind};
use crate::world::WorldSize;

const SEED_STEP: f32 = 0.1;

/// `2^(6·(scale − 0.5) − 2)`.
pub fn model_scale_for(scale: f32) -> f32 {
    2f32.powf(6.0 * (scale - 0.5) - 2.0)
}

/// Mesh resolution for a quality level, rounded to an even number of segments.
pub fn segments_for_quality(quality: f32) -> u32 {
    let level = 6.0 + 3.0 * quality.clamp(0.0, 1.0);
    2 * (0.5 * 2f32.powf(level)).round() as u32
}

/// Raw controls, derived fields and the products published so far in this pass.
///
/// Products are append-only: a label can be published once per pass.
#[derive(Clone, Debug)]
pub struct ControlSet {
    pub controls: Controls,
    pub model_scale: f32,
    pub seed: Vec2,
    /// Mesh resolution (segments per axis).
    pub dim: UVec2,
    pub size: WorldSize,
    products: Vec<(String, Arc<Product>)>,
}

impl ControlSet {
    /// Derive the computed fields from `controls`. The product list starts empty.
    pub fn derive(controls: Controls, size: WorldSize) -> Self {
        let segments = segments_for_quality(controls.quality);
        Self {
            model_scale: model_scale_for(controls.scale),
            seed: Vec2::new(SEED_STEP * controls.x, SEED_STEP * controls.y),
            dim: UVec2::splat(segments),
            size,
            controls,
            products: Vec::new(),
        }
    }

    pub fn is_draft(&self) -> bool {
        self.controls.draft
    }

    /// Labels of the published products, in publication order.
    pub fn product_labels(&self) -> impl Iterator<Item = &str> {
        self.products.iter().map(|(label, _)| label.as_str())
    }

    pub fn product(&self, label: &str) -> Option<&Arc<Product>> {
        self.products
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, product)| product)
    }

    /// Publish a product under `label`.
    pub fn insert_product(&mut self, label: impl Into<String>, product: Arc<Product>) -> Result<()> {
        let label = label.into();
        if self.product(&label).is_some() {
            return Err(Error::ProductAlreadySet { label });
        }
        self.products.push((label, product));
        Ok(())
    }

    /// Typed optional read of the product published under `T::LABEL`.
    pub fn get<T: ProductKind>(&self) -> Result<Option<&T>> {
        match self.product(T::LABEL) {
            None => Ok(None),
            Some(product) => T::from_product(product)
                .map(Some)
                .ok_or_else(|| Error::UnexpectedProduct {
                    label: T::LABEL.to_string(),
                    expected: T::KIND,
                }),
        }
    }

    /// Typed read that fails with [`Error::MissingDependency`] when the slot is empty.
    pub fn require<T: ProductKind>(&self, requester: &str) -> Result<&T> {
        self.get::<T>()?
            .ok_or_else(|| Error::missing(requester, T::LABEL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::water::WaterData;

    fn water() -> Arc<Product> {
        Arc::new(Product::Water(WaterData {
            level: 0.55,
            rivers: true,
        }))
    }

    #[test]
    fn derived_fields_follow_formulas() {
        let set = ControlSet::derive(Controls::default(), WorldSize::default());
        assert_eq!(set.model_scale, 0.25);
        assert!((set.seed.x - 3.3).abs() < 1e-6);
        assert!((set.seed.y - 0.3).abs() < 1e-6);
        assert_eq!(set.dim, UVec2::splat(182));
    }

    #[test]
    fn segments_are_even_for_all_tiers() {
        assert_eq!(segments_for_quality(0.0), 64);
        assert_eq!(segments_for_quality(1.0), 512);
        for i in 0..=20 {
            assert_eq!(segments_for_quality(i as f32 / 20.0) % 2, 0);
        }
    }

    #[test]
    fn model_scale_doubles_every_sixth() {
        assert_eq!(model_scale_for(0.5), 0.25);
        assert!((model_scale_for(0.5 + 1.0 / 6.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn products_are_append_only() {
        let mut set = ControlSet::derive(Controls::default(), WorldSize::default());
        set.insert_product("water", water()).unwrap();
        assert!(matches!(
            set.insert_product("water", water()),
            Err(Error::ProductAlreadySet { .. })
        ));
        assert_eq!(set.product_labels().collect::<Vec<_>>(), vec!["water"]);
    }

    #[test]
    fn typed_reads_report_missing_and_mismatched_slots() {
        let mut set = ControlSet::derive(Controls::default(), WorldSize::default());
        assert!(set.get::<WaterData>().unwrap().is_none());
        assert!(matches!(
            set.require::<WaterData>("shores"),
            Err(Error::MissingDependency { ref stage, ref dependency })
                if stage == "shores" && dependency == "water"
        ));

        set.insert_product("ground", water()).unwrap();
        assert!(matches!(
            set.get::<crate::stages::ground::GroundData>(),
            Err(Error::UnexpectedProduct { .. })
        ));

        set.insert_product("water", water()).unwrap();
        assert_eq!(set.require::<WaterData>("shores").unwrap().level, 0.55);
    }
}
