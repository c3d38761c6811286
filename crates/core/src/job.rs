//! Job: an ordered, nonempty batch of image numbers dispatched atomically (§3).

use crate::image_set::ImageNumber;
use serde::{Deserialize, Serialize};

/// A unit of dispatch: one or more image numbers, plus the flags a worker
/// needs to know how to run them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Image numbers in this job, in dispatch order. Never empty.
    pub image_numbers: Vec<ImageNumber>,
    /// The worker should run the pipeline's post-group aggregation step for
    /// this group once it finishes (grouped/aggregation runs only).
    pub worker_runs_post_group: bool,
    /// The worker must return the shared-dictionary vector alongside its
    /// success report (the run's bootstrap job only).
    pub wants_dictionary: bool,
}

impl Job {
    /// Construct a job, panicking on the precondition violation of an empty
    /// batch — callers (the planner) must never produce one.
    pub fn new(
        image_numbers: Vec<ImageNumber>,
        worker_runs_post_group: bool,
        wants_dictionary: bool,
    ) -> Self {
        debug_assert!(!image_numbers.is_empty(), "a job must carry at least one image number");
        Self { image_numbers, worker_runs_post_group, wants_dictionary }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
