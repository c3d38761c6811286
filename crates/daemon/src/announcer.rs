//! Announcer (C2, §4.2): publishes the boundary's endpoint so workers can
//! discover and attach. Workers poll this; when `retract` is called for an
//! id, the announcement ceases and subsequent polls see nothing for it.

use ac_core::AnalysisId;
use parking_lot::Mutex;

/// The address a worker should connect its transport to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub analysis_id: AnalysisId,
    pub address: String,
}

pub struct Announcer {
    current: Mutex<Option<Announcement>>,
}

impl Announcer {
    pub fn new() -> Self {
        Self { current: Mutex::new(None) }
    }

    /// Publish `address` as the live endpoint for `analysis_id`.
    pub fn publish(&self, analysis_id: AnalysisId, address: String) {
        *self.current.lock() = Some(Announcement { analysis_id, address });
    }

    /// What a polling worker currently sees, if anything is live.
    pub fn poll(&self) -> Option<Announcement> {
        self.current.lock().clone()
    }

    /// Stop announcing `analysis_id`. A no-op if a different (or no)
    /// analysis is currently announced.
    pub fn retract(&self, analysis_id: AnalysisId) {
        let mut current = self.current.lock();
        if matches!(current.as_ref(), Some(a) if a.analysis_id == analysis_id) {
            *current = None;
        }
    }
}

impl Default for Announcer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "announcer_tests.rs"]
mod tests;
