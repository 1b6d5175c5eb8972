//! Event types and sinks for observing pipeline passes.
//!
//! This module defines [`PipelineEvent`] and a set of sinks to emit, collect, or forward
//! events while building through [`crate::pipeline::orchestrator::Orchestrator`] or the
//! two-pass [`crate::pipeline::schedule::TwoPassBuilder`].
use std::time::Duration;

use crate::pipeline::orchestrator::{Pass, PassReport};

/// Describes events emitted while building a town.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// Emitted when a pass starts.
    PassStarted {
        pass: Pass,
        /// Index of the first stage that is executed.
        first_stage: usize,
        /// Total number of stages in the pipeline.
        stage_count: usize,
    },

    /// Emitted for every stage before the resume point; its retained product is reused.
    StageSkipped { index: usize, label: String },

    /// Emitted when a stage finished executing.
    StageFinished {
        index: usize,
        label: String,
        elapsed: Duration,
        /// Whether the stage returned a product.
        produced: bool,
    },

    /// Emitted when a pass finished.
    PassFinished { report: PassReport },

    /// Emitted after a draft pass, once the final pass has been scheduled.
    FinalPassScheduled {
        generation: u64,
        due_in: Duration,
        /// The requested quality differs from the last completed final pass, so the final
        /// pass has to rebuild geometry at a new resolution.
        quality_changed: bool,
    },

    /// Emitted when a scheduled final pass was dropped because a newer request arrived.
    FinalPassSuperseded { generation: u64, current: u64 },

    /// Non-fatal warning generated during a build.
    Warning {
        /// Context string (e.g. a stage label).
        context: String,
        message: String,
    },
}

/// A generic event sink that accepts [`PipelineEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: PipelineEvent);

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = PipelineEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: PipelineEvent) {}
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(PipelineEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(PipelineEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(PipelineEvent),
{
    #[inline]
    fn send(&mut self, event: PipelineEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects all events in a `Vec`.
#[derive(Default)]
pub struct VecSink {
    events: Vec<PipelineEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn into_inner(self) -> Vec<PipelineEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[PipelineEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of passes of the given kind that were started.
    pub fn passes_started(&self, kind: Pass) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::PassStarted { pass, .. } if *pass == kind))
            .count()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: PipelineEvent) {
        self.events.push(event);
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: PipelineEvent) {
        let Some((last, rest)) = self.sinks.split_last_mut() else {
            return;
        };
        for sink in rest {
            sink.send(event.clone());
        }
        last.send(event);
    }
}
