//! Interface loop (C7, §4.7): the top-half driver for one analysis run —
//! plans the work, bootstraps shared state from the first completed job,
//! merges measurements as they arrive, and reports progress until every
//! image set is `Done` or the run is cancelled.

use crate::event::{Event, EventSink};
use crate::merge::merge_received;
use crate::planner::{plan, Window};
use crate::pool::WorkerPool;
use crate::server::{InterfaceChannels, JobServer};
use ac_core::{AnalysisId, Job, Pipeline, ProcessingStatus};
use ac_store::{InMemoryStore, MeasurementStore};
use ac_wire::Response;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

/// Jobs withheld from the work queue until the bootstrap image set reports
/// its shared dictionaries (§9 Design Note: "wait for first image set").
enum Bootstrap {
    Pending(Vec<Job>),
    Done,
}

pub struct InterfaceLoop {
    pub analysis_id: AnalysisId,
    pub scratch_dir: PathBuf,
    pub cancel: CancellationToken,
    pub sink: Arc<dyn EventSink>,
    pub pool: Arc<WorkerPool>,
}

impl InterfaceLoop {
    /// Run to completion (or cancellation). `start_signal` is fired once
    /// the work queue has been seeded, unblocking the embedder's `start()`.
    pub async fn run(
        self,
        mut store: InMemoryStore,
        pipeline: &dyn Pipeline,
        window: Option<Window>,
        overwrite: bool,
        server: Arc<JobServer>,
        mut channels: InterfaceChannels,
        start_signal: oneshot::Sender<()>,
    ) {
        let mut started_posted = false;

        let outcome = self
            .drive(
                &mut store,
                pipeline,
                window,
                overwrite,
                &server,
                &mut channels,
                &mut started_posted,
                start_signal,
            )
            .await;

        if let Err(e) = outcome {
            error!(analysis_id = %self.analysis_id, error = %e, "interface loop failed");
        }
        let cancelled = self.cancel.is_cancelled();

        if started_posted {
            self.sink.post(Event::Finished {
                analysis_id: self.analysis_id,
                store: Box::new(store),
                cancelled,
            });
        }

        self.pool.stop().await;
    }

    #[allow(clippy::too_many_arguments)]
    async fn drive(
        &self,
        store: &mut InMemoryStore,
        pipeline: &dyn Pipeline,
        window: Option<Window>,
        overwrite: bool,
        server: &Arc<JobServer>,
        channels: &mut InterfaceChannels,
        started_posted: &mut bool,
        start_signal: oneshot::Sender<()>,
    ) -> Result<(), ac_core::CoordinatorError> {
        // Step 2: plan.
        let plan_result = plan(store, window, overwrite, pipeline)?;

        // Step 3: announce start.
        self.sink.post(Event::Started { analysis_id: self.analysis_id });
        *started_posted = true;

        // Step 4: seed the work queue.
        let mut bootstrap = Bootstrap::Done;
        if plan_result.grouped {
            server.enqueue(plan_result.jobs.clone());
        } else if let Some((first, rest)) = plan_result.jobs.split_first() {
            let mut bootstrap_job = first.clone();
            bootstrap_job.wants_dictionary = true;
            server.enqueue(std::iter::once(bootstrap_job));
            if !rest.is_empty() {
                bootstrap = Bootstrap::Pending(rest.to_vec());
            }
        }

        // Step 5: release the start signal.
        let _ = start_signal.send(());

        let image_sets_to_process = plan_result.image_sets_to_process;

        // Step 6: main loop. The completion check (recompute the
        // histogram, post Progress, then test "are all Done") always runs
        // before any blocking wait — for an empty `image_sets_to_process`
        // (e.g. a fully-Done resume) `.all()` is vacuously true, so the run
        // still posts its Progress and runs post_group/post_run before
        // exiting instead of returning early.
        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let counts = histogram(store, &image_sets_to_process);
            self.sink.post(Event::Progress { analysis_id: self.analysis_id, counts });

            if image_sets_to_process.iter().all(|n| store.status(*n) == Some(ProcessingStatus::Done)) {
                // Jobs in a grouped/aggregation run already had their
                // worker run post_group per group; an ungrouped run never
                // ran it at all, so the interface loop runs it once here,
                // positioned at the manifest's last image number.
                if !plan_result.grouped {
                    pipeline.post_group();
                }
                if let Some(data) = pipeline.post_run() {
                    self.sink.post(Event::DisplayPostRun {
                        analysis_id: self.analysis_id,
                        module_number: 0,
                        data,
                    });
                }
                break;
            }

            store.flush()?;

            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => break,

                Some(received) = channels.received_rx.recv() => {
                    self.merge_one(store, &received.image_numbers, &received.blob)?;
                    while let Ok(received) = channels.received_rx.try_recv() {
                        self.merge_one(store, &received.image_numbers, &received.blob)?;
                    }
                }

                Some(n) = channels.in_process_rx.recv() => {
                    store.set_status(n, ProcessingStatus::InProcess);
                    while let Ok(n) = channels.in_process_rx.try_recv() {
                        store.set_status(n, ProcessingStatus::InProcess);
                    }
                }

                Some(finished) = channels.finished_rx.recv() => {
                    self.handle_finished(store, pipeline, server, finished, &mut bootstrap);
                    while let Ok(finished) = channels.finished_rx.try_recv() {
                        self.handle_finished(store, pipeline, server, finished, &mut bootstrap);
                    }
                }
            }
        }

        Ok(())
    }

    fn merge_one(
        &self,
        store: &mut InMemoryStore,
        image_numbers: &[ac_core::ImageNumber],
        blob: &[u8],
    ) -> Result<(), ac_core::CoordinatorError> {
        let received = InMemoryStore::open_copy(blob, &self.scratch_dir)?;
        merge_received(store, &received, image_numbers);
        Ok(())
    }

    fn handle_finished(
        &self,
        store: &mut InMemoryStore,
        pipeline: &dyn Pipeline,
        server: &Arc<JobServer>,
        finished: crate::server::FinishedEntry,
        bootstrap: &mut Bootstrap,
    ) {
        store.set_status(finished.image_set_number, ProcessingStatus::FinishedWaiting);

        match finished.dictionaries {
            Some(dictionaries) => {
                if let Err(e) = ac_core::pipeline::validate_shared_dictionaries(pipeline, &dictionaries) {
                    warn!(analysis_id = %self.analysis_id, error = %e, "rejecting bootstrap dictionaries");
                    finished.reply.reply(Response::Error { message: e.to_string() });
                    return;
                }

                *server.shared_dictionaries().lock() = Some(dictionaries.clone());

                if let Bootstrap::Pending(rest) = std::mem::replace(bootstrap, Bootstrap::Done) {
                    server.enqueue(rest);
                }

                finished.reply.reply(Response::AckWithDictionary { dictionaries });
            }
            None => finished.reply.reply(Response::Ack),
        }
    }
}

fn histogram(store: &InMemoryStore, image_sets: &[ac_core::ImageNumber]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for n in image_sets {
        let label = match store.status(*n) {
            Some(ProcessingStatus::Unprocessed) | None => "Unprocessed",
            Some(ProcessingStatus::InProcess) => "InProcess",
            Some(ProcessingStatus::FinishedWaiting) => "FinishedWaiting",
            Some(ProcessingStatus::Done) => "Done",
        };
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
#[path = "interface_tests.rs"]
mod tests;
