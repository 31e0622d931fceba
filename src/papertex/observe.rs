//! Structured observability for the core transforms
//!
//! The sanitizer and extractor never print. Everything worth knowing about a
//! run (which spans were protected, which strategy matched, why a candidate
//! was dropped) is reported as an [`Event`] to an injected [`Observer`].
//!
//! Any `Fn(&Event) + Send + Sync` closure is an observer, so callers can wire
//! events into whatever they already use:
//!
//! ```rust,ignore
//! let sanitizer = Sanitizer::new().with_observer(Arc::new(|event: &Event| {
//!     eprintln!("{event:?}");
//! }));
//! ```
//!
//! [`TracingObserver`] forwards to `tracing`, [`RecordingObserver`] keeps the
//! events for later inspection.

use crate::papertex::diagnostics::Warning;
use crate::papertex::extract::Rejection;
use crate::papertex::sanitize::SpanKind;
use std::sync::{Arc, Mutex};

/// Something that happened while transforming a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A span was replaced by a placeholder before rewriting.
    SpanProtected { kind: SpanKind, len: usize },
    /// A legacy list option was rewritten to the `label=` form.
    ListOptionRewritten { from: String, to: String },
    /// A run of blank underscores became a blank construct.
    BlankRunCollapsed { run: usize, width_em: usize },
    /// A package the rewritten document needs was added to the preamble.
    PackageAdded { package: &'static str },
    /// Non-fatal problem with the input.
    Warning(Warning),
    /// The extractor narrowed its input to the byte range `start..end`.
    BodyNarrowed { start: usize, end: usize },
    /// One cascade strategy was applied.
    StrategyTried {
        strategy: &'static str,
        candidates: usize,
        accepted: usize,
    },
    /// A header matched but its question was not accepted.
    CandidateRejected {
        strategy: &'static str,
        number: String,
        reason: Rejection,
    },
    /// A later question reused an already seen number and was dropped.
    DuplicateDropped { number: u32 },
    /// No strategy produced an accepted question.
    NoStructureDetected,
}

/// Receiver of [`Event`]s.
pub trait Observer: Send + Sync {
    fn on_event(&self, event: &Event);
}

impl<F> Observer for F
where
    F: Fn(&Event) + Send + Sync,
{
    fn on_event(&self, event: &Event) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn on_event(&self, _event: &Event) {}
}

/// Forwards events to `tracing`: warnings at `warn`, a structureless
/// document at `info`, everything else at `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_event(&self, event: &Event) {
        match event {
            Event::Warning(warning) => tracing::warn!(%warning, "malformed input"),
            Event::NoStructureDetected => {
                tracing::info!("no question structure detected")
            }
            Event::StrategyTried {
                strategy,
                candidates,
                accepted,
            } => tracing::debug!(strategy, candidates, accepted, "strategy tried"),
            Event::CandidateRejected {
                strategy,
                number,
                reason,
            } => tracing::debug!(strategy, number = number.as_str(), ?reason, "candidate rejected"),
            other => tracing::debug!(event = ?other, "papertex event"),
        }
    }
}

/// Keeps every event it sees, in order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Observer for RecordingObserver {
    fn on_event(&self, event: &Event) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}

/// The observer components use when none is injected.
pub fn null_observer() -> Arc<dyn Observer> {
    Arc::new(NullObserver)
}
