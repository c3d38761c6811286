//! Property tests for protocol serde roundtrips, covering every variant of
//! `Request`, `Response`, and `ControlRequest`/`ControlResponse`.

use ac_core::{AnalysisId, ImageNumber};
use proptest::prelude::*;
use std::collections::BTreeMap;

use super::wire::{decode, encode};
use super::*;

fn all_requests() -> Vec<Request> {
    vec![
        Request::PipelinePreferences,
        Request::InitialMeasurements,
        Request::Work,
        Request::ImageSetSuccess { image_set_number: ImageNumber::new(1) },
        Request::ImageSetSuccessWithDictionary {
            image_set_number: ImageNumber::new(1),
            dictionaries: vec![],
        },
        Request::SharedDictionary,
        Request::MeasurementsReport { image_set_numbers: vec![], buf: vec![] },
        Request::AnalysisCancel,
        Request::Interaction { payload: serde_json::Value::Null },
        Request::Display { payload: serde_json::Value::Null },
        Request::DisplayPostGroup { payload: serde_json::Value::Null },
        Request::ExceptionReport { payload: serde_json::Value::Null },
        Request::DebugWaiting { payload: serde_json::Value::Null },
        Request::DebugComplete { payload: serde_json::Value::Null },
        Request::OmeroLogin { payload: serde_json::Value::Null },
    ]
}

fn all_responses() -> Vec<Response> {
    vec![
        Response::PipelinePreferences { pipeline_blob: vec![], preferences: BTreeMap::new() },
        Response::InitialMeasurements { buf: vec![] },
        Response::Work {
            image_set_numbers: vec![],
            worker_runs_post_group: false,
            wants_dictionary: false,
        },
        Response::NoWork,
        Response::Ack,
        Response::AckWithDictionary { dictionaries: vec![] },
        Response::SharedDictionary { dictionaries: vec![] },
        Response::Interactive { payload: serde_json::Value::Null },
        Response::Error { message: String::new() },
    ]
}

fn all_control_requests() -> Vec<ControlRequest> {
    vec![
        ControlRequest::Start {
            analysis_id: AnalysisId::new(),
            pipeline_blob: vec![],
            initial_measurements_blob: vec![],
            preferences: BTreeMap::new(),
            module_count: 2,
            requires_aggregation: false,
        },
        ControlRequest::Cancel { analysis_id: AnalysisId::new() },
        ControlRequest::Pause { analysis_id: AnalysisId::new() },
        ControlRequest::Resume { analysis_id: AnalysisId::new() },
        ControlRequest::Status { analysis_id: AnalysisId::new() },
    ]
}

fn all_control_responses() -> Vec<ControlResponse> {
    vec![
        ControlResponse::Started { analysis_id: AnalysisId::new() },
        ControlResponse::Cancelled { analysis_id: AnalysisId::new() },
        ControlResponse::Paused { analysis_id: AnalysisId::new() },
        ControlResponse::Resumed { analysis_id: AnalysisId::new() },
        ControlResponse::Status { counts: BTreeMap::new() },
        ControlResponse::Error { message: String::new() },
    ]
}

proptest! {
    #[test]
    fn request_serde_roundtrip(req in proptest::sample::select(all_requests())) {
        let encoded = encode(&req).expect("encode");
        let decoded: Request = decode(&encoded).expect("decode");
        prop_assert_eq!(decoded, req);
    }

    #[test]
    fn response_serde_roundtrip(resp in proptest::sample::select(all_responses())) {
        let encoded = encode(&resp).expect("encode");
        let decoded: Response = decode(&encoded).expect("decode");
        prop_assert_eq!(decoded, resp);
    }

    #[test]
    fn control_request_serde_roundtrip(req in proptest::sample::select(all_control_requests())) {
        let encoded = encode(&req).expect("encode");
        let decoded: ControlRequest = decode(&encoded).expect("decode");
        prop_assert_eq!(decoded, req);
    }

    #[test]
    fn control_response_serde_roundtrip(resp in proptest::sample::select(all_control_responses())) {
        let encoded = encode(&resp).expect("encode");
        let decoded: ControlResponse = decode(&encoded).expect("decode");
        prop_assert_eq!(decoded, resp);
    }
}
