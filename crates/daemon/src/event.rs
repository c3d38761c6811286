//! The event sink (§6): the embedder's window into a running analysis.
//!
//! Pipeline events and forwarded interactive requests are multiplexed into
//! the same typed channel as the core lifecycle events (Design Note:
//! "Pipeline event forwarding"), rather than routed through callback
//! chains.

use crate::boundary::ReplyHandle;
use ac_core::{AnalysisId, WorkerIndex};
use ac_store::InMemoryStore;
use ac_wire::Request;
use std::collections::BTreeMap;

/// One event posted by a running analysis. Delivery is synchronous from
/// the posting task — an embedder's `EventSink::post` implementation must
/// not block indefinitely, or it stalls whichever of C6/C7 posted it.
pub enum Event {
    /// The interface loop has begun serving work.
    Started { analysis_id: AnalysisId },

    /// The job server is now paused; no further merges/marks progress.
    Paused { analysis_id: AnalysisId },

    /// The job server has resumed after a pause.
    Resumed { analysis_id: AnalysisId },

    /// A status histogram over the image sets being processed.
    Progress { analysis_id: AnalysisId, counts: BTreeMap<&'static str, usize> },

    /// The interface loop has exited. Ownership of the measurement store
    /// transfers to whoever receives this event.
    Finished { analysis_id: AnalysisId, store: Box<InMemoryStore>, cancelled: bool },

    /// Fired once per post-run pipeline display callback.
    DisplayPostRun { analysis_id: AnalysisId, module_number: u32, data: serde_json::Value },

    /// A worker request the job server does not itself know how to answer
    /// (Interaction, Display, DisplayPostGroup, ExceptionReport,
    /// DebugWaiting, DebugComplete, OmeroLogin). The embedder must
    /// eventually invoke `reply` exactly once.
    Forwarded { analysis_id: AnalysisId, worker: WorkerIndex, request: Request, reply: ReplyHandle },
}

/// The embedder-supplied callback. The core posts events of the kinds
/// above; the embedder must not block indefinitely inside `post`.
pub trait EventSink: Send + Sync {
    fn post(&self, event: Event);
}

/// An `EventSink` that records every event it receives, for tests that
/// want to assert on the exact sequence an analysis produced.
#[cfg(test)]
pub struct RecordingSink {
    events: parking_lot::Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: parking_lot::Mutex::new(Vec::new()) }
    }

    pub fn labels(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

#[cfg(test)]
impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl EventSink for RecordingSink {
    fn post(&self, event: Event) {
        let label = match &event {
            Event::Started { .. } => "Started".to_string(),
            Event::Paused { .. } => "Paused".to_string(),
            Event::Resumed { .. } => "Resumed".to_string(),
            Event::Progress { counts, .. } => format!("Progress({:?})", counts),
            Event::Finished { cancelled, .. } => format!("Finished(cancelled={cancelled})"),
            Event::DisplayPostRun { module_number, .. } => {
                format!("DisplayPostRun(module={module_number})")
            }
            Event::Forwarded { request, .. } => format!("Forwarded({:?})", request),
        };
        self.events.lock().push(label);
    }
}
