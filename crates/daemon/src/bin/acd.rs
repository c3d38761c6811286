//! `acd`: standalone host process for the analysis run coordinator.
//!
//! Thin binary around the `ac-daemon` library: binds the worker-facing
//! transport (C1/C2) and the out-of-process control surface (§6.1), and
//! wires every request on both into the library's components. An embedder
//! that links `ac-daemon` directly has no need for this binary — it exists
//! for deployments that drive the coordinator as a separate process.

use ac_core::{AnalysisId, Pipeline};
use ac_daemon::{
    new_job_server, Announcer, Boundary, Config, Event, EventSink, InterfaceLoop, JobServer,
    WorkerLaunch, WorkerPool,
};
use ac_store::InMemoryStore;
use ac_wire::{ControlRequest, ControlResponse, Response};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Adapts the control surface's scheduling-relevant fields (§3) into the
/// `Pipeline` contract the planner and interface loop need. The coordinator
/// never looks inside `blob` itself.
struct BlobPipeline {
    blob: Vec<u8>,
    module_count: usize,
    requires_aggregation: bool,
}

impl Pipeline for BlobPipeline {
    fn module_count(&self) -> usize {
        self.module_count
    }

    fn requires_aggregation(&self) -> bool {
        self.requires_aggregation
    }

    fn serialize(&self) -> Vec<u8> {
        self.blob.clone()
    }
}

/// The one analysis this process may be running at a time (§5: "one
/// coordinator instance serves exactly one analysis").
struct ActiveAnalysis {
    analysis_id: AnalysisId,
    cancel: CancellationToken,
    server: Arc<JobServer>,
    progress: Arc<parking_lot::Mutex<BTreeMap<String, usize>>>,
}

/// Routes lifecycle events to logs, keeps the status histogram `Status`
/// control requests read, and tears down the boundary registration and
/// announcement once the run finishes.
struct DaemonSink {
    boundary: Arc<Boundary>,
    announcer: Arc<Announcer>,
    progress: Arc<parking_lot::Mutex<BTreeMap<String, usize>>>,
}

impl EventSink for DaemonSink {
    fn post(&self, event: Event) {
        match event {
            Event::Started { analysis_id } => info!(%analysis_id, "analysis started"),
            Event::Paused { analysis_id } => info!(%analysis_id, "analysis paused"),
            Event::Resumed { analysis_id } => info!(%analysis_id, "analysis resumed"),
            Event::Progress { counts, .. } => {
                *self.progress.lock() = counts.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
            }
            Event::Finished { analysis_id, cancelled, .. } => {
                info!(%analysis_id, cancelled, "analysis finished");
                self.boundary.cancel(analysis_id);
                self.announcer.retract(analysis_id);
            }
            Event::DisplayPostRun { analysis_id, module_number, .. } => {
                info!(%analysis_id, module_number, "post-run display");
            }
            // No further embedder to route to from a standalone process —
            // answer generically so the worker is never left waiting.
            Event::Forwarded { reply, .. } => {
                reply.reply(Response::Interactive { payload: serde_json::Value::Null });
            }
        }
    }
}

struct DaemonCtx {
    config: Config,
    boundary: Arc<Boundary>,
    announcer: Arc<Announcer>,
    pool: Arc<WorkerPool>,
    scratch_dir: std::path::PathBuf,
    worker_addr: String,
    active: parking_lot::Mutex<Option<ActiveAnalysis>>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config_path = std::env::args().nth(1).map(std::path::PathBuf::from);
    let config = Config::load(config_path.as_deref())?;

    let worker_listener = TcpListener::bind(&config.announce_addr).await?;
    let worker_addr = worker_listener.local_addr()?.to_string();
    let control_listener = TcpListener::bind(&config.control_addr).await?;
    let control_addr = control_listener.local_addr()?;
    info!(%worker_addr, %control_addr, "acd listening");

    let ctx = Arc::new(DaemonCtx {
        config,
        boundary: Arc::new(Boundary::new()),
        announcer: Arc::new(Announcer::new()),
        pool: Arc::new(WorkerPool::new()),
        scratch_dir: std::env::temp_dir(),
        worker_addr,
        active: parking_lot::Mutex::new(None),
    });

    let worker_task = tokio::spawn(run_worker_listener(worker_listener, Arc::clone(&ctx)));
    let control_task = tokio::spawn(run_control_listener(control_listener, Arc::clone(&ctx)));

    let _ = tokio::join!(worker_task, control_task);
    Ok(())
}

async fn run_worker_listener(listener: TcpListener, ctx: Arc<DaemonCtx>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let ctx = Arc::clone(&ctx);
                tokio::spawn(async move {
                    serve_worker(stream, ctx).await;
                    info!(%peer, "worker connection closed");
                });
            }
            Err(e) => {
                error!(error = %e, "worker listener accept failed");
                break;
            }
        }
    }
}

async fn serve_worker(mut stream: TcpStream, ctx: Arc<DaemonCtx>) {
    let index = ctx.boundary.next_worker_index();
    loop {
        let request = match ac_wire::read_request(&mut stream).await {
            Ok(r) => r,
            Err(e) => {
                warn!(worker = %index, error = %e, "malformed request, dropping connection");
                return;
            }
        };
        let response = match ctx.boundary.dispatch(index, request).await {
            Ok(r) => r,
            Err(e) => Response::Error { message: e.to_string() },
        };
        if let Err(e) = ac_wire::write_response(&mut stream, &response).await {
            warn!(worker = %index, error = %e, "failed to send reply, worker assumed dead");
            return;
        }
    }
}

async fn run_control_listener(listener: TcpListener, ctx: Arc<DaemonCtx>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let ctx = Arc::clone(&ctx);
                tokio::spawn(async move {
                    serve_control(stream, ctx).await;
                    info!(%peer, "control connection closed");
                });
            }
            Err(e) => {
                error!(error = %e, "control listener accept failed");
                break;
            }
        }
    }
}

async fn serve_control(mut stream: TcpStream, ctx: Arc<DaemonCtx>) {
    loop {
        let bytes = match ac_wire::read_message(&mut stream).await {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "malformed control message, dropping connection");
                return;
            }
        };
        let response = match ac_wire::decode::<ControlRequest>(&bytes) {
            Ok(request) => handle_control(&ctx, request).await,
            Err(e) => ControlResponse::Error { message: e.to_string() },
        };
        if write_control_response(&mut stream, &response).await.is_err() {
            return;
        }
    }
}

async fn write_control_response(
    stream: &mut TcpStream,
    response: &ControlResponse,
) -> Result<(), ac_wire::ProtocolError> {
    let bytes = ac_wire::encode(response)?;
    ac_wire::write_message(stream, &bytes).await
}

async fn handle_control(ctx: &Arc<DaemonCtx>, request: ControlRequest) -> ControlResponse {
    match request {
        ControlRequest::Start {
            analysis_id,
            pipeline_blob,
            initial_measurements_blob,
            preferences,
            module_count,
            requires_aggregation,
        } => {
            start_analysis(
                ctx,
                analysis_id,
                pipeline_blob,
                initial_measurements_blob,
                preferences,
                module_count,
                requires_aggregation,
            )
            .await
        }
        ControlRequest::Cancel { analysis_id } => with_matching_server(ctx, analysis_id, |active| {
            active.cancel.cancel();
            ControlResponse::Cancelled { analysis_id }
        }),
        ControlRequest::Pause { analysis_id } => with_matching_server(ctx, analysis_id, |active| {
            active.server.pause();
            ControlResponse::Paused { analysis_id }
        }),
        ControlRequest::Resume { analysis_id } => with_matching_server(ctx, analysis_id, |active| {
            active.server.resume();
            ControlResponse::Resumed { analysis_id }
        }),
        ControlRequest::Status { analysis_id } => with_matching_server(ctx, analysis_id, |active| {
            ControlResponse::Status { counts: active.progress.lock().clone() }
        }),
    }
}

fn with_matching_server(
    ctx: &Arc<DaemonCtx>,
    analysis_id: AnalysisId,
    f: impl FnOnce(&ActiveAnalysis) -> ControlResponse,
) -> ControlResponse {
    let guard = ctx.active.lock();
    match guard.as_ref() {
        Some(active) if active.analysis_id == analysis_id => f(active),
        _ => ControlResponse::Error { message: format!("no active analysis {analysis_id}") },
    }
}

#[allow(clippy::too_many_arguments)]
async fn start_analysis(
    ctx: &Arc<DaemonCtx>,
    analysis_id: AnalysisId,
    pipeline_blob: Vec<u8>,
    initial_measurements_blob: Vec<u8>,
    preferences: BTreeMap<String, String>,
    module_count: usize,
    requires_aggregation: bool,
) -> ControlResponse {
    {
        if ctx.active.lock().is_some() {
            return ControlResponse::Error { message: "an analysis is already running".to_string() };
        }
    }

    let store = match InMemoryStore::open_copy(&initial_measurements_blob, &ctx.scratch_dir) {
        Ok(s) => s,
        Err(e) => return ControlResponse::Error { message: e.to_string() },
    };

    let pipeline = Arc::new(BlobPipeline { blob: pipeline_blob.clone(), module_count, requires_aggregation });

    let cancel = CancellationToken::new();
    let progress = Arc::new(parking_lot::Mutex::new(BTreeMap::new()));
    let sink: Arc<dyn EventSink> = Arc::new(DaemonSink {
        boundary: Arc::clone(&ctx.boundary),
        announcer: Arc::clone(&ctx.announcer),
        progress: Arc::clone(&progress),
    });

    let (server, channels) = new_job_server(
        analysis_id,
        pipeline_blob,
        preferences,
        initial_measurements_blob,
        Default::default(),
        cancel.clone(),
        Arc::clone(&sink),
        ctx.config.received_queue_cap,
    );
    let server = Arc::new(server);

    let (inbox_tx, inbox_rx) = tokio::sync::mpsc::unbounded_channel();
    ctx.boundary.register(analysis_id, inbox_tx);

    let launch = WorkerLaunch {
        command: ctx.config.worker_command.clone(),
        announce_addr: ctx.worker_addr.clone(),
        plugins_dir: ctx.config.plugins_dir.clone(),
        env: Vec::new(),
        debug_port_base: ctx.config.debug_port_base,
    };
    if let Err(e) = ctx.pool.start(ctx.config.worker_count, &launch).await {
        ctx.boundary.cancel(analysis_id);
        return ControlResponse::Error { message: e.to_string() };
    }

    ctx.announcer.publish(analysis_id, ctx.worker_addr.clone());

    *ctx.active.lock() = Some(ActiveAnalysis {
        analysis_id,
        cancel: cancel.clone(),
        server: Arc::clone(&server),
        progress: Arc::clone(&progress),
    });

    let server_task = Arc::clone(&server);
    tokio::spawn(async move { server_task.run(inbox_rx).await });

    let (start_tx, start_rx) = oneshot::channel();
    let interface_loop = InterfaceLoop {
        analysis_id,
        scratch_dir: ctx.scratch_dir.clone(),
        cancel,
        sink,
        pool: Arc::clone(&ctx.pool),
    };
    let ctx_for_teardown = Arc::clone(ctx);
    tokio::spawn(async move {
        interface_loop.run(store, pipeline.as_ref(), None, false, server, channels, start_tx).await;
        let mut guard = ctx_for_teardown.active.lock();
        if matches!(guard.as_ref(), Some(a) if a.analysis_id == analysis_id) {
            *guard = None;
        }
    });

    match start_rx.await {
        Ok(()) => ControlResponse::Started { analysis_id },
        Err(_) => {
            warn!(%analysis_id, "interface loop ended before seeding the work queue");
            ControlResponse::Error { message: "interface loop failed to start".to_string() }
        }
    }
}

#[cfg(test)]
#[path = "acd_tests.rs"]
mod tests;
