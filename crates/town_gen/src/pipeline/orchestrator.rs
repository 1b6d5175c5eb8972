//! Ordered stage execution with partial rebuilds.
//!
//! The orchestrator owns the stage list, the [`World`] and one retained product slot per
//! stage. A build either runs every stage or resumes at a named stage: stages before the
//! resume point are not executed and re-publish their retained product, every later
//! stage has its retained product discarded and runs again.
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::controls::{ControlSet, Controls};
use crate::error::{Error, Result};
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::events::{EventSink, PipelineEvent};
use crate::pipeline::stage::Stage;
use crate::product::Product;
use crate::scene::SubScene;
use crate::stages::stages_with_placement;
use crate::world::World;

/// Which half of the two-pass protocol a build belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    /// Lowest resolution; expensive stages return early.
    Draft,
    /// Requested resolution.
    Final,
}

/// Timing of one executed stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageTiming {
    pub index: usize,
    pub label: String,
    pub elapsed: Duration,
    pub produced: bool,
}

/// Summary of one completed pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PassReport {
    pub pass: Pass,
    /// Index of the first executed stage.
    pub first_stage: usize,
    /// Executed stages, in order.
    pub stages: Vec<StageTiming>,
    pub elapsed: Duration,
}

impl PassReport {
    pub fn executed_labels(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|t| t.label.as_str())
    }
}

/// Runs the stages of a town pipeline against a [`World`].
pub struct Orchestrator {
    config: PipelineConfig,
    stages: Vec<Box<dyn Stage>>,
    retained: Vec<Option<Arc<Product>>>,
    world: World,
    last_controls: Option<ControlSet>,
    /// Set after a pass completed; a failed pass leaves the retained slots unusable for
    /// partial rebuilds.
    consistent: bool,
}

impl Orchestrator {
    /// Create an orchestrator running the standard stages.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let stages = stages_with_placement(config.placement.clone());
        Self::with_stages(config, stages)
    }

    /// Create an orchestrator running a custom stage list.
    ///
    /// Labels must be unique and every dependency must name an earlier stage.
    pub fn with_stages(config: PipelineConfig, stages: Vec<Box<dyn Stage>>) -> Result<Self> {
        config.validate()?;

        let mut seen = HashSet::new();
        for stage in &stages {
            for dep in stage.dependencies() {
                if !seen.contains(dep) {
                    return Err(Error::InvalidConfig(format!(
                        "stage '{}' depends on '{}', which is not an earlier stage",
                        stage.label(),
                        dep
                    )));
                }
            }
            if !seen.insert(stage.label()) {
                return Err(Error::InvalidConfig(format!(
                    "duplicate stage label '{}'",
                    stage.label()
                )));
            }
        }

        let retained = vec![None; stages.len()];
        Ok(Self {
            world: World::new(config.world_size),
            config,
            stages,
            retained,
            last_controls: None,
            consistent: false,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Stage labels in execution order.
    pub fn stage_labels(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|s| s.label())
    }

    pub fn stage_index(&self, label: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.label() == label)
    }

    /// Product retained from the last run of the stage `label`.
    pub fn retained(&self, label: &str) -> Option<&Arc<Product>> {
        self.stage_index(label)
            .and_then(|i| self.retained[i].as_ref())
    }

    /// Control set of the last completed pass.
    pub fn last_controls(&self) -> Option<&ControlSet> {
        self.last_controls.as_ref()
    }

    /// Runs one pass, returning its report.
    pub fn build(&mut self, controls: &Controls, rebuild_from: Option<&str>) -> Result<PassReport> {
        self.build_with_events(controls, rebuild_from, &mut ())
    }

    /// Runs one pass, sending events to `sink`.
    ///
    /// The resume label and the controls are checked before anything is modified. A
    /// stage error aborts the pass and is returned as is.
    pub fn build_with_events(
        &mut self,
        controls: &Controls,
        rebuild_from: Option<&str>,
        sink: &mut dyn EventSink,
    ) -> Result<PassReport> {
        let mut first = match rebuild_from {
            None => 0,
            Some(label) => self
                .stage_index(label)
                .ok_or_else(|| Error::UnknownStage {
                    label: label.to_string(),
                })?,
        };
        controls.validate()?;

        if first > 0 && !self.consistent {
            let message = "no complete earlier pass to resume from; rebuilding everything";
            warn!("{}.", message);
            sink.send(PipelineEvent::Warning {
                context: self.stages[first].label().to_string(),
                message: message.to_string(),
            });
            first = 0;
        }

        let pass = if controls.draft {
            Pass::Draft
        } else {
            Pass::Final
        };
        let started = Instant::now();
        sink.send(PipelineEvent::PassStarted {
            pass,
            first_stage: first,
            stage_count: self.stages.len(),
        });

        let mut set = ControlSet::derive(controls.clone(), self.world.size());
        let removed = if first == 0 {
            self.world.scene_mut().clear_all()
        } else {
            self.world.scene_mut().clear_from(first)
        };
        debug!("Cleared {} sub-scenes.", removed);
        self.consistent = false;

        let mut timings = Vec::with_capacity(self.stages.len() - first);
        for (index, stage) in self.stages.iter().enumerate() {
            let label = stage.label();

            if index < first {
                if let Some(product) = &self.retained[index] {
                    set.insert_product(label, product.clone())?;
                }
                debug!("Stage '{}' not executed; reusing its last product.", label);
                sink.send(PipelineEvent::StageSkipped {
                    index,
                    label: label.to_string(),
                });
                continue;
            }

            self.retained[index] = None;
            let stage_started = Instant::now();
            let product = stage.create(&set).inspect_err(|err| {
                warn!("Stage '{}' failed: {}.", label, err);
            })?;
            let elapsed = stage_started.elapsed();
            let produced = product.is_some();

            if let Some(product) = product {
                let product = Arc::new(product);
                set.insert_product(label, product.clone())?;
                self.world.scene_mut().push(SubScene {
                    stage_index: index,
                    label: label.to_string(),
                    product: product.clone(),
                });
                self.retained[index] = Some(product);
            }

            info!("Stage '{}' finished in {:?}.", label, elapsed);
            sink.send(PipelineEvent::StageFinished {
                index,
                label: label.to_string(),
                elapsed,
                produced,
            });
            timings.push(StageTiming {
                index,
                label: label.to_string(),
                elapsed,
                produced,
            });
        }

        let report = PassReport {
            pass,
            first_stage: first,
            stages: timings,
            elapsed: started.elapsed(),
        };
        info!(
            "{:?} pass finished in {:?} ({} stages executed).",
            pass,
            report.elapsed,
            report.stages.len()
        );
        self.consistent = true;
        self.last_controls = Some(set);
        sink.send(PipelineEvent::PassFinished {
            report: report.clone(),
        });
        Ok(report)
    }
}
