//! Processing status state machine for image sets (§3).
//!
//! ```text
//! Unprocessed ─dispatch→ InProcess ─success→ FinishedWaiting ─merged→ Done
//!          ↑______________worker lost / replan_______________________|
//! ```

use serde::{Deserialize, Serialize};

/// Status of one image set's progress through a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Unprocessed,
    InProcess,
    FinishedWaiting,
    Done,
}

impl ProcessingStatus {
    /// The feature name this status is stored under on the `Image` entity.
    pub const FEATURE: &'static str = "ProcessingStatus";

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unprocessed => "Unprocessed",
            Self::InProcess => "InProcess",
            Self::FinishedWaiting => "FinishedWaiting",
            Self::Done => "Done",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Unprocessed" => Some(Self::Unprocessed),
            "InProcess" => Some(Self::InProcess),
            "FinishedWaiting" => Some(Self::FinishedWaiting),
            "Done" => Some(Self::Done),
            _ => None,
        }
    }

    /// Whether `self -> next` is a legal forward transition along the state
    /// machine, or a replan reset back to `Unprocessed` from anywhere.
    pub fn can_transition_to(self, next: Self) -> bool {
        use ProcessingStatus::*;
        match (self, next) {
            (Unprocessed, InProcess) => true,
            (InProcess, FinishedWaiting) => true,
            (FinishedWaiting, Done) => true,
            (_, Unprocessed) => true, // replan reset, valid from any state
            (a, b) if a == b => true, // idempotent re-write
            _ => false,
        }
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
