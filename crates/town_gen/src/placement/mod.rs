//! Road-aligned building placement.
//!
//! One building site candidate is derived per road segment: the segment midpoint pushed
//! sideways off the road centreline, rotated to face along the road. A candidate is
//! kept only if the terrain under it lies within the flat band published by the shore
//! stage. Variation (material, stretched axis) is a pure function of how many buildings
//! were emitted before it in the same call, so placement is fully deterministic.
use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{Vec2, Vec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::controls::ControlSet;
use crate::error::{Error, Result};
use crate::pipeline::stage::Stage;
use crate::product::Product;
use crate::roads::{RoadNetwork, RoadSegment};
use crate::stages::ground::GroundData;
use crate::stages::labels;
use crate::stages::shores::ShoreData;
use crate::terrain::HeightField;

mod spacing;
pub mod template;
pub mod variation;

use spacing::SpacingGrid;
pub use template::{BuildingTemplate, RIDGE_OFFSET};
pub use variation::{
    BuildingMaterial, ScaleAxis, Variation, AXIS_SEQUENCE, DEFAULT_PALETTE, SCALE_AXIS_FACTOR,
};

/// Building scale per unit of road integrity.
pub const BUILDING_SCALE_PER_INTEGRITY: f32 = 0.2;

/// Lateral offset of a site from the road centreline, in building scales.
pub const ROAD_OFFSET_FACTOR: f32 = 1.5;

/// Sign applied to the horizontal `y` coordinate when it becomes the world `z` axis.
/// The height field's `+y` points into the screen, the scene's `+z` out of it.
pub const GROUND_AXIS_FLIP: f32 = -1.0;

/// A not-yet-validated placement proposal for one road segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SiteCandidate {
    pub segment_index: usize,
    pub mid: Vec2,
    /// `atan2(Δx, Δy)` of the segment. The argument order is intentional.
    pub angle: f32,
    /// Horizontal position next to the road.
    pub position: Vec2,
}

impl SiteCandidate {
    pub fn from_segment(segment_index: usize, segment: &RoadSegment, building_scale: f32) -> Self {
        let (v1, v2) = (segment.v1, segment.v2);
        let mid = 0.5 * (v1 + v2);
        let angle = (v2.x - v1.x).atan2(v2.y - v1.y);
        let offset = ROAD_OFFSET_FACTOR * building_scale;
        let position = Vec2::new(
            mid.x + offset * (-angle).cos(),
            mid.y + offset * (-angle).sin(),
        );
        Self {
            segment_index,
            mid,
            angle,
            position,
        }
    }

    /// Rotation about the vertical axis that aligns a building with its road.
    pub fn yaw(&self) -> f32 {
        -self.angle - FRAC_PI_2
    }
}

/// Tolerance interval around the height buildable ground is levelled to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlatBand {
    /// World height of flat ground.
    pub height: f32,
    /// Allowed absolute deviation in world units.
    pub epsilon: f32,
}

impl FlatBand {
    pub fn contains(&self, height: f32) -> bool {
        (height - self.height).abs() <= self.epsilon
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildingInstance {
    pub position: Vec3,
    /// Rotation about the world up axis, in radians.
    pub yaw: f32,
    pub scale: Vec3,
    pub material_index: usize,
}

/// Counters describing one placement call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlacementStats {
    pub candidates: usize,
    pub placed: usize,
    pub rejected_out_of_domain: usize,
    pub rejected_not_flat: usize,
    pub rejected_spacing: usize,
}

/// Output of the building stage.
#[derive(Clone, Debug)]
pub struct BuildingSet {
    /// Instances in road-segment order.
    pub instances: Vec<BuildingInstance>,
    /// Geometry shared by every instance.
    pub template: Arc<BuildingTemplate>,
    pub stats: PlacementStats,
}

impl BuildingSet {
    pub fn empty(template: Arc<BuildingTemplate>) -> Self {
        Self {
            instances: Vec::new(),
            template,
            stats: PlacementStats::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// Settings of the placement engine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementConfig {
    /// Materials cycled through by consecutive buildings.
    pub palette: Vec<BuildingMaterial>,
    /// If set, sites closer than this to an already accepted site are dropped.
    pub min_spacing: Option<f32>,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.to_vec(),
            min_spacing: None,
        }
    }
}

impl PlacementConfig {
    pub fn with_palette(mut self, palette: Vec<BuildingMaterial>) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_min_spacing(mut self, min_spacing: f32) -> Self {
        self.min_spacing = Some(min_spacing);
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.palette.is_empty() {
            return Err(Error::InvalidConfig("palette must not be empty".into()));
        }
        if let Some(spacing) = self.min_spacing {
            if !spacing.is_finite() || spacing <= 0.0 {
                return Err(Error::InvalidConfig("min_spacing must be > 0".into()));
            }
        }
        Ok(())
    }
}

/// Place one building per road segment whose offset site is on flat ground.
///
/// `terrain.flat_height()` is used as the vertical position of every building; the
/// band decides which sites count as flat. Out-of-domain sites are skipped. A
/// `min_spacing` that [`PlacementConfig::validate`] rejects (non-finite or not positive)
/// disables the spacing filter.
pub fn place_buildings(
    roads: &RoadNetwork,
    terrain: &dyn HeightField,
    band: FlatBand,
    config: &PlacementConfig,
) -> (Vec<BuildingInstance>, PlacementStats) {
    let building_scale = BUILDING_SCALE_PER_INTEGRITY * roads.integrity;
    let ground_flat_height = terrain.flat_height();
    let palette_size = config.palette.len();
    let mut spacing = config
        .min_spacing
        .filter(|s| s.is_finite() && *s > 0.0)
        .map(SpacingGrid::new);

    let mut stats = PlacementStats::default();
    let mut instances = Vec::new();
    // Counts emitted buildings only; restarts with every call.
    let mut n = 0usize;

    for (index, segment) in roads.segments.iter().enumerate() {
        stats.candidates += 1;
        let site = SiteCandidate::from_segment(index, segment, building_scale);

        match terrain.height_at(site.position) {
            Err(err) => {
                trace!("Site {} discarded: {}.", index, err);
                stats.rejected_out_of_domain += 1;
                continue;
            }
            Ok(height) if !band.contains(height) => {
                trace!(
                    "Site {} discarded: height {} outside {} ± {}.",
                    index,
                    height,
                    band.height,
                    band.epsilon
                );
                stats.rejected_not_flat += 1;
                continue;
            }
            Ok(_) => {}
        }

        if let Some(grid) = spacing.as_mut() {
            if !grid.try_insert(site.position) {
                trace!("Site {} discarded: too close to another building.", index);
                stats.rejected_spacing += 1;
                continue;
            }
        }

        let variation = Variation::for_building(n, palette_size);
        instances.push(BuildingInstance {
            position: Vec3::new(
                site.position.x,
                ground_flat_height,
                GROUND_AXIS_FLIP * site.position.y,
            ),
            yaw: site.yaw(),
            scale: variation.scale(building_scale),
            material_index: variation.material_index,
        });
        n += 1;
    }

    stats.placed = instances.len();
    (instances, stats)
}

/// The `buildings` stage.
pub struct BuildingStage {
    config: PlacementConfig,
    template: Arc<BuildingTemplate>,
}

impl BuildingStage {
    pub fn new(config: PlacementConfig) -> Self {
        Self {
            config,
            template: Arc::new(BuildingTemplate::gabled_house()),
        }
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    pub fn template(&self) -> &Arc<BuildingTemplate> {
        &self.template
    }

    fn empty(&self) -> Option<Product> {
        Some(BuildingSet::empty(self.template.clone()).into())
    }
}

impl Default for BuildingStage {
    fn default() -> Self {
        Self::new(PlacementConfig::default())
    }
}

impl Stage for BuildingStage {
    fn label(&self) -> &str {
        labels::BUILDINGS
    }

    fn dependencies(&self) -> &[&'static str] {
        &[labels::GROUND, labels::SHORES, labels::ROADS]
    }

    fn create(&self, controls: &ControlSet) -> Result<Option<Product>> {
        if controls.is_draft() {
            debug!("Draft pass; skipping building placement.");
            return Ok(self.empty());
        }
        let Some(roads) = controls.get::<RoadNetwork>()? else {
            debug!("No road network yet; skipping building placement.");
            return Ok(self.empty());
        };

        let ground = controls.require::<GroundData>(self.label())?;
        let shores = controls.require::<ShoreData>(self.label())?;
        let height_limit = ground.terrain.size().height_limit;
        let band = FlatBand {
            height: shores.flat_height * height_limit,
            epsilon: shores.flat_epsilon * height_limit,
        };

        let (instances, stats) = place_buildings(roads, &shores.terrain, band, &self.config);
        info!(
            "Placed {} buildings from {} road segments ({} off-terrain, {} not flat).",
            stats.placed,
            stats.candidates,
            stats.rejected_out_of_domain,
            stats.rejected_not_flat
        );

        Ok(Some(
            BuildingSet {
                instances,
                template: self.template.clone(),
                stats,
            }
            .into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use glam::UVec2;

    use super::*;
    use crate::controls::Controls;
    use crate::terrain::GridHeightField;
    use crate::world::WorldSize;

    const FLAT: f32 = 0.5;

    fn flat_field(extent: f32) -> GridHeightField {
        GridHeightField::from_fn(
            WorldSize::new(extent, extent, 1.0),
            UVec2::splat(64),
            |_| FLAT,
        )
        .with_flat_height(FLAT)
    }

    fn band() -> FlatBand {
        FlatBand {
            height: FLAT,
            epsilon: 0.01,
        }
    }

    fn seg(x1: f32, y1: f32, x2: f32, y2: f32) -> RoadSegment {
        RoadSegment::new(Vec2::new(x1, y1), Vec2::new(x2, y2))
    }

    #[test]
    fn single_east_west_segment_places_building_south_of_road() {
        let roads = RoadNetwork::new(vec![seg(0.0, 0.0, 10.0, 0.0)], 1.0);
        let (instances, stats) =
            place_buildings(&roads, &flat_field(20.0), band(), &PlacementConfig::default());

        assert_eq!(stats.placed, 1);
        let b = instances[0];
        assert!((b.position.x - 5.0).abs() < 1e-5);
        assert_eq!(b.position.y, FLAT);
        assert!((b.position.z - 0.3).abs() < 1e-5);
        assert!((b.yaw + PI).abs() < 1e-6);
        assert!((b.scale - Vec3::new(0.3, 0.2, 0.2)).abs().max_element() < 1e-6);
        assert_eq!(b.material_index, 0);
    }

    #[test]
    fn candidate_offsets_by_one_and_a_half_building_scales() {
        let site = SiteCandidate::from_segment(0, &seg(0.0, 0.0, 10.0, 0.0), 0.2);
        assert_eq!(site.mid, Vec2::new(5.0, 0.0));
        assert!((site.angle - FRAC_PI_2).abs() < 1e-6);
        assert!((site.position - Vec2::new(5.0, -0.3)).length() < 1e-5);
    }

    #[test]
    fn yaw_matches_segment_direction_exactly() {
        let segments = vec![
            seg(0.0, 0.0, 1.0, 0.0),
            seg(0.0, 0.0, 0.0, 1.0),
            seg(1.0, 1.0, -2.0, 0.5),
            seg(-3.0, 2.0, -3.5, -1.0),
            seg(2.0, -2.0, 2.7, -2.7),
        ];
        let roads = RoadNetwork::new(segments.clone(), 0.5);
        let (instances, _) =
            place_buildings(&roads, &flat_field(20.0), band(), &PlacementConfig::default());

        assert_eq!(instances.len(), segments.len());
        for (b, s) in instances.iter().zip(&segments) {
            let expected = -(s.v2.x - s.v1.x).atan2(s.v2.y - s.v1.y) - FRAC_PI_2;
            assert_eq!(b.yaw, expected);
        }
    }

    #[test]
    fn placement_is_deterministic() {
        let segments: Vec<_> = (0..40)
            .map(|i| {
                let t = i as f32 * 0.37;
                seg(t.cos() * 3.0, t.sin() * 3.0, t.cos() * 4.0, (t * 1.3).sin() * 4.0)
            })
            .collect();
        let roads = RoadNetwork::new(segments, 0.8);
        let terrain = GridHeightField::from_fn(WorldSize::new(12.0, 12.0, 1.0), UVec2::splat(96), |p| {
            0.5 + 0.02 * (p.x * 1.7).sin() * (p.y * 0.9).cos()
        })
        .with_flat_height(0.5);

        let config = PlacementConfig::default();
        let (a, stats_a) = place_buildings(&roads, &terrain, band(), &config);
        let (b, stats_b) = place_buildings(&roads, &terrain, band(), &config);

        assert_eq!(stats_a, stats_b);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.position.to_array().map(f32::to_bits), y.position.to_array().map(f32::to_bits));
            assert_eq!(x.yaw.to_bits(), y.yaw.to_bits());
            assert_eq!(x.scale.to_array().map(f32::to_bits), y.scale.to_array().map(f32::to_bits));
            assert_eq!(x.material_index, y.material_index);
        }
    }

    #[test]
    fn flatness_filter_splits_candidates_by_band() {
        // Height rises with x: only sites near x == 0 are flat.
        let terrain = GridHeightField::from_fn(WorldSize::new(20.0, 20.0, 1.0), UVec2::splat(200), |p| {
            FLAT + 0.005 * p.x
        })
        .with_flat_height(FLAT);
        let segments: Vec<_> = (-8..=8)
            .map(|i| seg(i as f32, -1.0, i as f32, 1.0))
            .collect();
        let roads = RoadNetwork::new(segments.clone(), 1.0);
        let (instances, stats) =
            place_buildings(&roads, &terrain, band(), &PlacementConfig::default());

        assert!(stats.placed > 0);
        assert!(stats.rejected_not_flat > 0);
        assert_eq!(stats.placed + stats.rejected_not_flat, segments.len());

        let mut accepted = instances.iter();
        for s in &segments {
            let site = SiteCandidate::from_segment(0, s, 0.2);
            let h = terrain.height_at(site.position).unwrap();
            if band().contains(h) {
                let b = accepted.next().expect("flat site must be placed");
                assert!((b.position.x - site.position.x).abs() < 1e-6);
            } else {
                assert!((h - FLAT).abs() > band().epsilon);
            }
        }
        assert!(accepted.next().is_none());
    }

    #[test]
    fn out_of_domain_sites_are_skipped_without_consuming_variation() {
        let roads = RoadNetwork::new(
            vec![
                seg(0.0, 0.0, 1.0, 0.0),
                seg(50.0, 50.0, 51.0, 50.0),
                seg(0.0, 2.0, 1.0, 2.0),
            ],
            1.0,
        );
        let (instances, stats) =
            place_buildings(&roads, &flat_field(10.0), band(), &PlacementConfig::default());
        assert_eq!(stats.rejected_out_of_domain, 1);
        let materials: Vec<_> = instances.iter().map(|b| b.material_index).collect();
        assert_eq!(materials, vec![0, 1]);
    }

    #[test]
    fn empty_network_yields_empty_output() {
        let roads = RoadNetwork::default();
        let (instances, stats) =
            place_buildings(&roads, &flat_field(10.0), band(), &PlacementConfig::default());
        assert!(instances.is_empty());
        assert_eq!(stats, PlacementStats::default());
    }

    #[test]
    fn min_spacing_drops_crowded_sites() {
        let roads = RoadNetwork::new(
            vec![seg(0.0, 0.0, 1.0, 0.0), seg(0.0, 0.0, 1.0, 0.0), seg(0.0, 3.0, 1.0, 3.0)],
            1.0,
        );
        let config = PlacementConfig::default().with_min_spacing(0.5);
        let (instances, stats) = place_buildings(&roads, &flat_field(10.0), band(), &config);
        assert_eq!(instances.len(), 2);
        assert_eq!(stats.rejected_spacing, 1);

        let (instances, _) =
            place_buildings(&roads, &flat_field(10.0), band(), &PlacementConfig::default());
        assert_eq!(instances.len(), 3);
    }

    #[test]
    fn invalid_min_spacing_disables_the_filter() {
        let roads = RoadNetwork::new(vec![seg(0.0, 0.0, 1.0, 0.0), seg(0.0, 0.0, 1.0, 0.0)], 1.0);
        for spacing in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let config = PlacementConfig::default().with_min_spacing(spacing);
            assert!(config.validate().is_err());
            let (instances, stats) = place_buildings(&roads, &flat_field(10.0), band(), &config);
            assert_eq!(instances.len(), 2);
            assert_eq!(stats.rejected_spacing, 0);
        }
    }

    #[test]
    fn config_validation() {
        assert!(PlacementConfig::default().validate().is_ok());
        assert!(PlacementConfig::default()
            .with_palette(Vec::new())
            .validate()
            .is_err());
        assert!(PlacementConfig::default()
            .with_min_spacing(0.0)
            .validate()
            .is_err());
    }

    fn control_set(draft: bool) -> ControlSet {
        let controls = Controls {
            draft,
            ..Controls::default()
        };
        ControlSet::derive(controls, WorldSize::new(20.0, 20.0, 1.0))
    }

    fn publish_terrain(set: &mut ControlSet) {
        let field = flat_field(20.0);
        set.insert_product(
            labels::GROUND,
            Arc::new(GroundData::new(field.clone()).into()),
        )
        .unwrap();
        set.insert_product(
            labels::SHORES,
            Arc::new(ShoreData::new(FLAT, 0.01, field, 0).into()),
        )
        .unwrap();
    }

    fn publish_roads(set: &mut ControlSet) {
        let roads = RoadNetwork::new(vec![seg(0.0, 0.0, 10.0, 0.0)], 1.0);
        set.insert_product(labels::ROADS, Arc::new(roads.into()))
            .unwrap();
    }

    fn buildings(product: Option<Product>) -> BuildingSet {
        match product {
            Some(Product::Buildings(set)) => set,
            other => panic!("expected buildings, got {other:?}"),
        }
    }

    #[test]
    fn stage_places_buildings_from_published_products() {
        let mut set = control_set(false);
        publish_terrain(&mut set);
        publish_roads(&mut set);
        let out = buildings(BuildingStage::default().create(&set).unwrap());
        assert_eq!(out.len(), 1);
        assert!((out.instances[0].position.z - 0.3).abs() < 1e-5);
    }

    #[test]
    fn stage_without_roads_returns_empty_set() {
        let mut set = control_set(false);
        publish_terrain(&mut set);
        let out = buildings(BuildingStage::default().create(&set).unwrap());
        assert!(out.is_empty());
    }

    #[test]
    fn draft_pass_returns_empty_set_despite_roads() {
        let mut set = control_set(true);
        publish_terrain(&mut set);
        publish_roads(&mut set);
        let stage = BuildingStage::default();
        let out = buildings(stage.create(&set).unwrap());
        assert!(out.is_empty());
        assert_eq!(out.stats, PlacementStats::default());

        // Same products, final pass.
        set.controls.draft = false;
        let out = buildings(stage.create(&set).unwrap());
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn stage_with_roads_but_no_terrain_fails_fast() {
        let mut set = control_set(false);
        publish_roads(&mut set);
        let err = BuildingStage::default().create(&set).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingDependency { ref stage, ref dependency }
                if stage == "buildings" && dependency == "ground"
        ));
    }
}
