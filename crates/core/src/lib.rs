//! ac-core: domain types shared by the analysis run coordinator.
//!
//! This crate holds the data model only — identifiers, the processing-status
//! state machine, job shapes, the pipeline/shared-dictionary contracts, and
//! the error taxonomy. It has no knowledge of sockets, processes, or the
//! physical measurement store encoding; those live in sibling crates.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod macros;

pub mod clock;
pub mod error;
pub mod id;
pub mod image_set;
pub mod job;
pub mod pipeline;
pub mod status;

pub use clock::{Clock, FakeClock, SystemClock};
pub use error::CoordinatorError;
pub use id::short;
pub use image_set::{GroupIndex, GroupNumber, ImageNumber};
pub use job::Job;
pub use pipeline::{Pipeline, SharedDictionaries, SharedDictionary};
pub use status::ProcessingStatus;

crate::define_id! {
    /// Unique identifier for one analysis run.
    pub struct AnalysisId("an-");
}

/// Index of a worker within the pool, assigned at spawn time (0-based).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct WorkerIndex(pub u32);

impl std::fmt::Display for WorkerIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}
