//! Requests a worker sends to the coordinator over the boundary (§6).

use ac_core::ImageNumber;
use serde::{Deserialize, Serialize};

/// A module-defined payload the core neither validates nor interprets;
/// it is round-tripped to the event sink and back.
pub type ModulePayload = serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Ask for the pipeline blob and a snapshot of global preferences.
    PipelinePreferences,

    /// Ask for the run's initial measurements blob.
    InitialMeasurements,

    /// Ask for a job. Replied with `Work` or `NoWork`.
    Work,

    /// Report that an image set finished successfully.
    ImageSetSuccess { image_set_number: ImageNumber },

    /// Like `ImageSetSuccess`, but this was the run's bootstrap job — carries
    /// the shared dictionaries the worker just computed, one per pipeline
    /// module, for the coordinator to install and echo back.
    ImageSetSuccessWithDictionary {
        image_set_number: ImageNumber,
        dictionaries: Vec<ModulePayload>,
    },

    /// Ask for the current shared-dictionaries vector.
    SharedDictionary,

    /// Report measurements gathered for a batch of image sets.
    MeasurementsReport {
        image_set_numbers: Vec<ImageNumber>,
        buf: Vec<u8>,
    },

    /// Request cancellation of the whole analysis.
    AnalysisCancel,

    /// Module-defined requests forwarded verbatim to the embedder's event
    /// sink; the embedder's eventual call to `reply` is what answers them.
    Interaction { payload: ModulePayload },
    Display { payload: ModulePayload },
    DisplayPostGroup { payload: ModulePayload },
    ExceptionReport { payload: ModulePayload },
    DebugWaiting { payload: ModulePayload },
    DebugComplete { payload: ModulePayload },
    OmeroLogin { payload: ModulePayload },
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
