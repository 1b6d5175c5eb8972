//! Generation pipeline: stage contract, orchestrator, two-pass scheduling and events.
pub mod config;
pub mod events;
pub mod orchestrator;
pub mod schedule;
pub mod stage;

pub use config::{PipelineConfig, DEFAULT_FINAL_PASS_DELAY};
pub use orchestrator::{Orchestrator, Pass, PassReport, StageTiming};
pub use schedule::{BuildPhase, BuildRequest, BuildRequester, FinalTicket, PollOutcome, TwoPassBuilder};
pub use stage::{FnStage, Stage};
