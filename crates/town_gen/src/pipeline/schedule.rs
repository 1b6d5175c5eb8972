//! Draft/final two-pass building.
//!
//! Every request first runs a cheap draft pass at quality 0 with the draft flag set, then
//! schedules the final pass at the requested quality a short delay later. Requests are
//! numbered by a shared generation counter; a scheduled final pass only runs if no newer
//! request has been submitted since, so a burst of requests produces one final pass.
//!
//! Coalesced requests keep the earliest resume stage of the requests they merge, and the
//! final pass resumes no later than the earliest stage any draft rebuilt since the last
//! final pass, so no draft-quality product survives a final pass.
//!
//! Time is passed in explicitly: [`TwoPassBuilder::poll`] is driven by the host's frame
//! loop or timer and never sleeps.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::controls::Controls;
use crate::error::{Error, Result};
use crate::pipeline::events::{EventSink, PipelineEvent};
use crate::pipeline::orchestrator::{Orchestrator, PassReport};

/// Where the two-pass protocol currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Idle,
    DraftRunning,
    FinalPending,
    FinalRunning,
}

/// A build request: controls plus an optional stage to resume from.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildRequest {
    pub controls: Controls,
    pub rebuild_from: Option<String>,
}

/// A scheduled final pass.
#[derive(Debug, Clone)]
pub struct FinalTicket {
    /// Generation of the request that scheduled it.
    pub generation: u64,
    pub due: Instant,
    pub request: BuildRequest,
}

/// Result of one [`TwoPassBuilder::poll`].
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// Nothing queued and nothing scheduled.
    Idle,
    /// A final pass is scheduled for `due`.
    Waiting { due: Instant },
    /// A draft pass ran and its final pass was scheduled.
    Draft(PassReport),
    /// A final pass ran.
    Final(PassReport),
    /// A scheduled final pass was dropped and nothing newer was queued.
    Superseded { generation: u64 },
}

#[derive(Debug, Default)]
struct Shared {
    generation: AtomicU64,
    queued: Mutex<Option<(u64, BuildRequest)>>,
    /// Stage labels in execution order, for merging resume points.
    stage_labels: Vec<String>,
}

impl Shared {
    fn new(stage_labels: Vec<String>) -> Self {
        Self {
            stage_labels,
            ..Self::default()
        }
    }

    fn submit(&self, mut request: BuildRequest) -> u64 {
        let mut queued = self.queued.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((_, previous)) = queued.take() {
            request.rebuild_from = self.earliest(previous.rebuild_from, request.rebuild_from);
            debug!(
                "Coalesced queued build request into generation {} (resume from {:?}).",
                generation, request.rebuild_from
            );
        }
        *queued = Some((generation, request));
        generation
    }

    /// The earlier of two resume points. A full rebuild wins; an unknown label is kept so
    /// the poll that takes the request rejects it.
    fn earliest(&self, a: Option<String>, b: Option<String>) -> Option<String> {
        let (a, b) = (a?, b?);
        let index = |label: &str| self.stage_labels.iter().position(|l| l == label);
        match (index(&a), index(&b)) {
            (Some(i), Some(j)) if j < i => Some(b),
            (Some(_), None) => Some(b),
            _ => Some(a),
        }
    }

    fn take(&self) -> Option<(u64, BuildRequest)> {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn current(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

/// Cloneable handle for submitting requests from outside the build loop, e.g. from UI
/// callbacks on another thread.
#[derive(Debug, Clone)]
pub struct BuildRequester {
    shared: Arc<Shared>,
}

impl BuildRequester {
    /// Queue a request, replacing any queued one, and supersede the scheduled final pass.
    /// Returns the request's generation.
    pub fn submit(&self, controls: Controls, rebuild_from: Option<&str>) -> u64 {
        self.shared.submit(BuildRequest {
            controls,
            rebuild_from: rebuild_from.map(str::to_string),
        })
    }

    pub fn generation(&self) -> u64 {
        self.shared.current()
    }
}

/// Drives an [`Orchestrator`] through draft and final passes.
pub struct TwoPassBuilder {
    orchestrator: Orchestrator,
    shared: Arc<Shared>,
    phase: BuildPhase,
    ticket: Option<FinalTicket>,
    final_pass_delay: Duration,
    /// Quality of the last completed final pass.
    last_quality: Option<f32>,
    /// Earliest stage rebuilt by a draft pass since the last completed final pass.
    draft_floor: Option<usize>,
}

impl TwoPassBuilder {
    pub fn new(orchestrator: Orchestrator) -> Self {
        let final_pass_delay = orchestrator.config().final_pass_delay;
        let stage_labels = orchestrator.stage_labels().map(str::to_string).collect();
        Self {
            orchestrator,
            shared: Arc::new(Shared::new(stage_labels)),
            phase: BuildPhase::Idle,
            ticket: None,
            final_pass_delay,
            last_quality: None,
            draft_floor: None,
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn into_orchestrator(self) -> Orchestrator {
        self.orchestrator
    }

    pub fn phase(&self) -> BuildPhase {
        self.phase
    }

    pub fn pending(&self) -> Option<&FinalTicket> {
        self.ticket.as_ref()
    }

    /// When the scheduled final pass becomes due, if any.
    pub fn next_due(&self) -> Option<Instant> {
        self.ticket.as_ref().map(|t| t.due)
    }

    pub fn generation(&self) -> u64 {
        self.shared.current()
    }

    pub fn requester(&self) -> BuildRequester {
        BuildRequester {
            shared: self.shared.clone(),
        }
    }

    /// Queue a request. See [`BuildRequester::submit`].
    pub fn submit(&self, controls: Controls, rebuild_from: Option<&str>) -> u64 {
        self.requester().submit(controls, rebuild_from)
    }

    /// Submit and immediately poll.
    pub fn request(
        &mut self,
        controls: Controls,
        rebuild_from: Option<&str>,
        now: Instant,
    ) -> Result<PollOutcome> {
        self.submit(controls, rebuild_from);
        self.poll(now)
    }

    pub fn poll(&mut self, now: Instant) -> Result<PollOutcome> {
        self.poll_with_events(now, &mut ())
    }

    /// Advance the protocol to `now`.
    ///
    /// A scheduled final pass is checked against the current generation first and dropped
    /// if stale. Otherwise it runs once due. A queued request then starts a new draft;
    /// requests that arrived while a final pass ran are picked up on the next poll.
    pub fn poll_with_events(&mut self, now: Instant, sink: &mut dyn EventSink) -> Result<PollOutcome> {
        let mut superseded = None;

        if let Some(ticket) = self.ticket.take() {
            let current = self.shared.current();
            if ticket.generation != current {
                warn!(
                    "Final pass of generation {} superseded by generation {}.",
                    ticket.generation, current
                );
                sink.send(PipelineEvent::FinalPassSuperseded {
                    generation: ticket.generation,
                    current,
                });
                self.phase = BuildPhase::Idle;
                superseded = Some(ticket.generation);
            } else if now >= ticket.due {
                return self.run_final(ticket.request, sink).map(PollOutcome::Final);
            } else {
                let due = ticket.due;
                self.ticket = Some(ticket);
                return Ok(PollOutcome::Waiting { due });
            }
        }

        let Some((generation, request)) = self.shared.take() else {
            return Ok(match superseded {
                Some(generation) => PollOutcome::Superseded { generation },
                None => PollOutcome::Idle,
            });
        };

        let requested_first = match request.rebuild_from.as_deref() {
            None => 0,
            Some(label) => {
                self.orchestrator
                    .stage_index(label)
                    .ok_or_else(|| Error::UnknownStage {
                        label: label.to_string(),
                    })?
            }
        };

        if request.controls.quality <= 0.0 {
            debug!("Quality 0 requested; running the final pass directly.");
            return self.run_final(request, sink).map(PollOutcome::Final);
        }

        self.phase = BuildPhase::DraftRunning;
        // Recorded before the pass so a failed draft still forces its stages to rebuild.
        self.lower_draft_floor(requested_first);
        let draft = Controls {
            quality: 0.0,
            draft: true,
            ..request.controls.clone()
        };
        let report = self
            .orchestrator
            .build_with_events(&draft, request.rebuild_from.as_deref(), sink)
            .inspect_err(|_| self.phase = BuildPhase::Idle)?;
        self.lower_draft_floor(report.first_stage);

        let quality_changed = self.last_quality != Some(request.controls.quality);
        debug!(
            "Final pass of generation {} scheduled in {:?}.",
            generation, self.final_pass_delay
        );
        sink.send(PipelineEvent::FinalPassScheduled {
            generation,
            due_in: self.final_pass_delay,
            quality_changed,
        });
        self.ticket = Some(FinalTicket {
            generation,
            due: now + self.final_pass_delay,
            request,
        });
        self.phase = BuildPhase::FinalPending;
        Ok(PollOutcome::Draft(report))
    }

    fn lower_draft_floor(&mut self, first_stage: usize) {
        self.draft_floor = Some(self.draft_floor.map_or(first_stage, |f| f.min(first_stage)));
    }

    /// Resume label for a final pass: the request's own stage, moved back to the earliest
    /// stage a draft rebuilt.
    fn final_resume(&self, rebuild_from: Option<String>) -> Option<String> {
        let requested = match rebuild_from.as_deref() {
            None => 0,
            Some(label) => self.orchestrator.stage_index(label)?,
        };
        let first = self.draft_floor.map_or(requested, |f| f.min(requested));
        if first == requested {
            return rebuild_from;
        }
        debug!("Final pass resumes from stage {} to replace draft products.", first);
        if first == 0 {
            None
        } else {
            self.orchestrator.stage_labels().nth(first).map(str::to_string)
        }
    }

    fn run_final(&mut self, request: BuildRequest, sink: &mut dyn EventSink) -> Result<PassReport> {
        self.phase = BuildPhase::FinalRunning;
        let controls = Controls {
            draft: false,
            ..request.controls
        };
        let rebuild_from = self.final_resume(request.rebuild_from);
        let result = self
            .orchestrator
            .build_with_events(&controls, rebuild_from.as_deref(), sink);
        self.phase = BuildPhase::Idle;
        if result.is_ok() {
            self.last_quality = Some(controls.quality);
            self.draft_floor = None;
        }
        result
    }
}
