//! Coordinator-wide error taxonomy (§7).

use thiserror::Error;

/// Every failure mode the coordinator needs to distinguish, across the
/// boundary, planner, and store adapter. Sibling crates wrap their own
/// transport/IO errors into this type via `#[from]` at the seam where they
/// surface to a caller that needs the taxonomy rather than the plumbing.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// Boundary I/O failure talking to a worker. Logged and swallowed at the
    /// transport layer; only surfaced here when it prevents progress.
    #[error("transport error: {0}")]
    Transport(String),

    /// Unknown request variant or malformed frame.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The measurement store is missing metadata the planner requires
    /// (e.g. no image numbers in the manifest).
    #[error("planning error: {0}")]
    Planning(String),

    /// A job's image numbers were dispatched but never returned; the worker
    /// that held them is presumed dead. Not retried (§9 Open Questions).
    #[error("worker {worker} crashed holding image sets {image_numbers:?}")]
    WorkerCrash { worker: crate::WorkerIndex, image_numbers: Vec<crate::ImageNumber> },

    /// A module raised during execution; forwarded to the embedder as an
    /// `ExceptionReport` rather than treated as a coordinator-level failure.
    #[error("module exception: {0}")]
    ModuleException(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}
