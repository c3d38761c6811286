//! Control-surface messages for an out-of-process embedder (§6.1): the
//! same framing that carries worker requests also carries start/cancel/
//! pause/resume for an embedder that is not simply an in-process caller of
//! the `Analysis` facade.

use ac_core::AnalysisId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ControlRequest {
    Start {
        analysis_id: AnalysisId,
        pipeline_blob: Vec<u8>,
        initial_measurements_blob: Vec<u8>,
        preferences: BTreeMap<String, String>,
        /// Number of modules in the pipeline (§3) — the one scheduling-
        /// relevant fact about the blob's contents an out-of-process
        /// embedder must surface, since the core never deserializes the
        /// blob itself.
        module_count: usize,
        /// Whether the pipeline declares a need for post-group
        /// aggregation (§4.5) — forces per-group dispatch and overwrite.
        requires_aggregation: bool,
    },
    Cancel { analysis_id: AnalysisId },
    Pause { analysis_id: AnalysisId },
    Resume { analysis_id: AnalysisId },
    Status { analysis_id: AnalysisId },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ControlResponse {
    Started { analysis_id: AnalysisId },
    Cancelled { analysis_id: AnalysisId },
    Paused { analysis_id: AnalysisId },
    Resumed { analysis_id: AnalysisId },
    Status { counts: BTreeMap<String, usize> },
    Error { message: String },
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
