//! Typed stage products.
//!
//! Every stage publishes at most one [`Product`] per pass. Consumers read it back through
//! [`crate::controls::ControlSet::get`] or [`crate::controls::ControlSet::require`] with
//! the payload type, which knows its canonical stage label via [`ProductKind`].
use crate::placement::BuildingSet;
use crate::roads::RoadNetwork;
use crate::stages::ground::GroundData;
use crate::stages::labels;
use crate::stages::shores::ShoreData;
use crate::stages::surrounding::SurroundingData;
use crate::stages::water::WaterData;

#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum Product {
    Ground(GroundData),
    Water(WaterData),
    Shores(ShoreData),
    Surrounding(SurroundingData),
    Roads(RoadNetwork),
    Buildings(BuildingSet),
}

impl Product {
    /// Short name of the payload type, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Product::Ground(_) => GroundData::KIND,
            Product::Water(_) => WaterData::KIND,
            Product::Shores(_) => ShoreData::KIND,
            Product::Surrounding(_) => SurroundingData::KIND,
            Product::Roads(_) => RoadNetwork::KIND,
            Product::Buildings(_) => BuildingSet::KIND,
        }
    }
}

/// A payload type stored in a [`Product`] under a fixed stage label.
pub trait ProductKind: Sized {
    /// Label of the stage that publishes this payload.
    const LABEL: &'static str;
    /// Short type name for diagnostics.
    const KIND: &'static str;

    fn from_product(product: &Product) -> Option<&Self>;
}

macro_rules! product_kind {
    ($ty:ty, $variant:ident, $label:expr, $kind:literal) => {
        impl ProductKind for $ty {
            const LABEL: &'static str = $label;
            const KIND: &'static str = $kind;

            fn from_product(product: &Product) -> Option<&Self> {
                match product {
                    Product::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Product {
            fn from(value: $ty) -> Self {
                Product::$variant(value)
            }
        }
    };
}

product_kind!(GroundData, Ground, labels::GROUND, "ground");
product_kind!(WaterData, Water, labels::WATER, "water");
product_kind!(ShoreData, Shores, labels::SHORES, "shores");
product_kind!(SurroundingData, Surrounding, labels::SURROUNDING, "surrounding");
product_kind!(RoadNetwork, Roads, labels::ROADS, "roads");
product_kind!(BuildingSet, Buildings, labels::BUILDINGS, "buildings");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downcast_matches_variant_only() {
        let product: Product = WaterData {
            level: 0.3,
            rivers: false,
        }
        .into();
        assert_eq!(product.kind(), "water");
        assert!(WaterData::from_product(&product).is_some());
        assert!(RoadNetwork::from_product(&product).is_none());
    }
}
