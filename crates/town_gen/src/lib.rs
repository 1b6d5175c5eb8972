#![forbid(unsafe_code)]
//! town_gen: Procedural town generation with partial rebuilds and road-aligned building placement.
//!
//! Modules:
//! - controls: raw user controls, the control schema and the per-pass control set
//! - pipeline: stage contract, orchestrator, draft/final scheduling, events
//! - placement: deterministic building placement along roads
//! - stages: reference terrain, water, shore, surrounding and road stages
//! - terrain, roads, scene, world: shared data model
//!
//! Runnable demos live in the `town_gen_examples` crate.
pub mod controls;
pub mod error;
pub mod pipeline;
pub mod placement;
pub mod product;
pub mod roads;
pub mod sampling;
pub mod scene;
pub mod stages;
pub mod terrain;
pub mod world;

/// Convenient re-exports for common types. Import with `use town_gen::prelude::*;`.
pub mod prelude {
    pub use crate::controls::{ControlSet, ControlValue, Controls, CONTROL_SPECS};
    pub use crate::error::{Error, Result};
    pub use crate::pipeline::events::{EventSink, FnSink, MultiSink, PipelineEvent, VecSink};
    pub use crate::pipeline::{
        BuildPhase, BuildRequester, Orchestrator, Pass, PassReport, PipelineConfig, PollOutcome,
        Stage, TwoPassBuilder,
    };
    pub use crate::placement::{
        place_buildings, BuildingInstance, BuildingSet, BuildingStage, BuildingTemplate, FlatBand,
        PlacementConfig,
    };
    pub use crate::product::{Product, ProductKind};
    pub use crate::roads::{RoadNetwork, RoadSegment};
    pub use crate::scene::{SceneCollection, SceneNode, SubScene};
    pub use crate::stages::{default_stages, labels};
    pub use crate::terrain::{GridHeightField, HeightField, OutOfDomain};
    pub use crate::world::{World, WorldSize};
}
