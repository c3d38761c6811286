//! Job server (C6, §4.6): consumes framed requests from the boundary
//! inbox and services each one in O(1), handing off the requests that
//! require the interface loop's attention (finished reports, measurement
//! reports, interactive forwards) onto channels the interface loop drains.

use crate::boundary::{Inbound, ReplyHandle};
use crate::event::{Event, EventSink};
use ac_core::{AnalysisId, ImageNumber, Job, WorkerIndex};
use ac_wire::{Request, Response};
use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use tokio_util::sync::CancellationToken;
use tracing::error;

/// A success report the interface loop must drain: mark the image set
/// FinishedWaiting, possibly install the shared dictionaries, then reply.
pub struct FinishedEntry {
    pub image_set_number: ImageNumber,
    /// `Some` only for an `ImageSetSuccessWithDictionary` report — the
    /// dictionaries the worker just computed, awaiting installation.
    pub dictionaries: Option<Vec<serde_json::Value>>,
    pub reply: ReplyHandle,
}

/// A measurement report the interface loop must merge.
pub struct ReceivedEntry {
    pub image_numbers: Vec<ImageNumber>,
    pub blob: Vec<u8>,
}

/// The interface loop's read side of the three queues the job server
/// writes to.
pub struct InterfaceChannels {
    pub in_process_rx: mpsc::UnboundedReceiver<ImageNumber>,
    pub finished_rx: mpsc::UnboundedReceiver<FinishedEntry>,
    pub received_rx: mpsc::Receiver<ReceivedEntry>,
}

struct ServerChannels {
    in_process_tx: mpsc::UnboundedSender<ImageNumber>,
    finished_tx: mpsc::UnboundedSender<FinishedEntry>,
    received_tx: mpsc::Sender<ReceivedEntry>,
}

/// Shared, read-mostly run state the job server answers requests from.
pub struct JobServer {
    analysis_id: AnalysisId,
    pipeline_blob: Vec<u8>,
    preferences: BTreeMap<String, String>,
    initial_measurements_blob: Vec<u8>,
    work_queue: Mutex<VecDeque<Job>>,
    shared_dictionaries: Arc<Mutex<Option<Vec<serde_json::Value>>>>,
    cancel: CancellationToken,
    paused: AtomicBool,
    pause_notify: Notify,
    sink: Arc<dyn EventSink>,
    channels: ServerChannels,
}

/// Construct the job server plus the interface loop's matching channel
/// endpoints.
pub fn new_job_server(
    analysis_id: AnalysisId,
    pipeline_blob: Vec<u8>,
    preferences: BTreeMap<String, String>,
    initial_measurements_blob: Vec<u8>,
    jobs: VecDeque<Job>,
    cancel: CancellationToken,
    sink: Arc<dyn EventSink>,
    received_queue_cap: usize,
) -> (JobServer, InterfaceChannels) {
    let (in_process_tx, in_process_rx) = mpsc::unbounded_channel();
    let (finished_tx, finished_rx) = mpsc::unbounded_channel();
    let (received_tx, received_rx) = mpsc::channel(received_queue_cap);

    let server = JobServer {
        analysis_id,
        pipeline_blob,
        preferences,
        initial_measurements_blob,
        work_queue: Mutex::new(jobs),
        shared_dictionaries: Arc::new(Mutex::new(None)),
        cancel,
        paused: AtomicBool::new(false),
        pause_notify: Notify::new(),
        sink,
        channels: ServerChannels { in_process_tx, finished_tx, received_tx },
    };

    (server, InterfaceChannels { in_process_rx, finished_rx, received_rx })
}

impl JobServer {
    /// Push more jobs onto the work queue (§4.7 step 6: releasing the
    /// remaining jobs after bootstrap completes).
    pub fn enqueue(&self, jobs: impl IntoIterator<Item = Job>) {
        self.work_queue.lock().extend(jobs);
    }

    pub fn shared_dictionaries(&self) -> Arc<Mutex<Option<Vec<serde_json::Value>>>> {
        Arc::clone(&self.shared_dictionaries)
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
        self.sink.post(Event::Paused { analysis_id: self.analysis_id });
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.pause_notify.notify_waiters();
        self.sink.post(Event::Resumed { analysis_id: self.analysis_id });
    }

    /// Drive the dispatch table until cancelled. `inbox` receives requests
    /// routed by the boundary.
    pub async fn run(&self, mut inbox: mpsc::UnboundedReceiver<Inbound>) {
        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            if self.paused.load(Ordering::SeqCst) {
                tokio::select! {
                    _ = tokio::time::sleep(std::time::Duration::from_secs(1)) => {}
                    _ = self.pause_notify.notified() => {}
                    _ = self.cancel.cancelled() => break,
                }
                continue;
            }

            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                next = inbox.recv() => next,
            };

            match next {
                Some(inbound) => self.handle(inbound).await,
                None => break,
            }
        }
    }

    async fn handle(&self, inbound: Inbound) {
        let Inbound { worker, request, reply } = inbound;
        match request {
            Request::PipelinePreferences => reply.reply(Response::PipelinePreferences {
                pipeline_blob: self.pipeline_blob.clone(),
                preferences: self.preferences.clone(),
            }),

            Request::InitialMeasurements => {
                reply.reply(Response::InitialMeasurements { buf: self.initial_measurements_blob.clone() })
            }

            Request::Work => {
                let job = self.work_queue.lock().pop_front();
                match job {
                    Some(job) => {
                        for &n in &job.image_numbers {
                            let _ = self.channels.in_process_tx.send(n);
                        }
                        reply.reply(Response::Work {
                            image_set_numbers: job.image_numbers,
                            worker_runs_post_group: job.worker_runs_post_group,
                            wants_dictionary: job.wants_dictionary,
                        });
                    }
                    None => reply.reply(Response::NoWork),
                }
            }

            Request::ImageSetSuccess { image_set_number } => {
                let entry = FinishedEntry { image_set_number, dictionaries: None, reply };
                if self.channels.finished_tx.send(entry).is_err() {
                    error!(%worker, "finished queue closed, dropping success report");
                }
            }

            Request::ImageSetSuccessWithDictionary { image_set_number, dictionaries } => {
                let entry = FinishedEntry { image_set_number, dictionaries: Some(dictionaries), reply };
                if self.channels.finished_tx.send(entry).is_err() {
                    error!(%worker, "finished queue closed, dropping success report");
                }
            }

            Request::SharedDictionary => {
                let dictionaries = self.shared_dictionaries.lock().clone().unwrap_or_default();
                reply.reply(Response::SharedDictionary { dictionaries });
            }

            Request::MeasurementsReport { image_set_numbers, buf } => {
                let entry = ReceivedEntry { image_numbers: image_set_numbers, blob: buf };
                // Backpressure is intentional: a full received-measurements
                // queue delays this Ack, which is what keeps the worker
                // from reporting more than the coordinator can absorb.
                if self.channels.received_tx.send(entry).await.is_ok() {
                    reply.reply(Response::Ack);
                } else {
                    reply.reply(Response::Error { message: "received queue closed".to_string() });
                }
            }

            Request::AnalysisCancel => {
                self.cancel.cancel();
                reply.reply(Response::Ack);
            }

            interactive @ (Request::Interaction { .. }
            | Request::Display { .. }
            | Request::DisplayPostGroup { .. }
            | Request::ExceptionReport { .. }
            | Request::DebugWaiting { .. }
            | Request::DebugComplete { .. }
            | Request::OmeroLogin { .. }) => {
                self.sink.post(Event::Forwarded {
                    analysis_id: self.analysis_id,
                    worker,
                    request: interactive,
                    reply,
                });
            }
        }
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
