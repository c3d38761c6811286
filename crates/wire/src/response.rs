//! Replies the coordinator sends back to a worker (§6).

use crate::request::ModulePayload;
use ac_core::ImageNumber;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Reply to `PipelinePreferences`.
    PipelinePreferences { pipeline_blob: Vec<u8>, preferences: BTreeMap<String, String> },

    /// Reply to `InitialMeasurements`.
    InitialMeasurements { buf: Vec<u8> },

    /// Reply to `Work` when the queue has a job.
    Work {
        image_set_numbers: Vec<ImageNumber>,
        worker_runs_post_group: bool,
        wants_dictionary: bool,
    },

    /// Reply to `Work` when the queue is empty.
    NoWork,

    /// Plain acknowledgement — most success/report/cancel replies.
    Ack,

    /// Acknowledgement to an `ImageSetSuccessWithDictionary` request,
    /// carrying the dictionaries the bootstrap job just produced.
    AckWithDictionary { dictionaries: Vec<ModulePayload> },

    /// Reply to `SharedDictionary`.
    SharedDictionary { dictionaries: Vec<ModulePayload> },

    /// A module-defined reply to a forwarded interactive request, supplied
    /// by the embedder and passed back through unexamined.
    Interactive { payload: ModulePayload },

    /// A request could not be serviced.
    Error { message: String },
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
