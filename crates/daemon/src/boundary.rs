//! Message boundary (C1, §4.1): the transport-level server that frames
//! worker requests, routes replies back to the originating worker, and
//! tracks outstanding requests for cancellation.
//!
//! The boundary itself never decides what a request means — it only
//! delivers `(worker, request, reply_handle)` triples into the single
//! registered analysis's inbox and completes the matching reply handle
//! when the answer comes back. Per the non-goal of multi-tenant
//! isolation, a boundary holds at most one registration at a time rather
//! than a map keyed by analysis id.

use ac_core::{AnalysisId, CoordinatorError, WorkerIndex};
use ac_wire::{Request, Response};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// One request delivered into an analysis's inbox, carrying the capability
/// to answer it.
pub struct Inbound {
    pub worker: WorkerIndex,
    pub request: Request,
    pub reply: ReplyHandle,
}

type OutstandingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Response>>>>;

/// Opaque, single-use capability that sends a reply to the originating
/// worker request (§9 Design Note: modeled as an id into the boundary
/// rather than a back-pointer).
pub struct ReplyHandle {
    id: u64,
    outstanding: OutstandingMap,
}

impl ReplyHandle {
    /// Send `response` back to the worker that made this request. Consumes
    /// the handle — a second reply is unrepresentable, not merely an error.
    pub fn reply(self, response: Response) {
        if let Some(tx) = self.outstanding.lock().remove(&self.id) {
            let _ = tx.send(response);
        }
    }
}

struct Registration {
    analysis_id: AnalysisId,
    inbox: mpsc::UnboundedSender<Inbound>,
}

pub struct Boundary {
    slot: Mutex<Option<Registration>>,
    outstanding: OutstandingMap,
    next_worker: AtomicU32,
    next_request_id: AtomicU64,
}

impl Boundary {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            outstanding: Arc::new(Mutex::new(HashMap::new())),
            next_worker: AtomicU32::new(0),
            next_request_id: AtomicU64::new(0),
        }
    }

    /// Begin accepting requests tagged with `analysis_id`, delivering them
    /// into `inbox`.
    pub fn register(&self, analysis_id: AnalysisId, inbox: mpsc::UnboundedSender<Inbound>) {
        *self.slot.lock() = Some(Registration { analysis_id, inbox });
    }

    /// Assign the next worker its index, in spawn order.
    pub fn next_worker_index(&self) -> WorkerIndex {
        WorkerIndex(self.next_worker.fetch_add(1, Ordering::Relaxed))
    }

    /// Route `request` from `worker` into the registered analysis's inbox
    /// and await its reply. Used by the per-connection transport task.
    pub async fn dispatch(
        &self,
        worker: WorkerIndex,
        request: Request,
    ) -> Result<Response, CoordinatorError> {
        let inbox = {
            let guard = self.slot.lock();
            guard
                .as_ref()
                .map(|r| r.inbox.clone())
                .ok_or_else(|| CoordinatorError::Transport("no analysis registered".to_string()))?
        };

        let id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.outstanding.lock().insert(id, tx);
        let reply = ReplyHandle { id, outstanding: Arc::clone(&self.outstanding) };

        if inbox.send(Inbound { worker, request, reply }).is_err() {
            self.outstanding.lock().remove(&id);
            return Err(CoordinatorError::Transport("analysis inbox closed".to_string()));
        }

        rx.await
            .map_err(|_| CoordinatorError::Transport("reply handle dropped unanswered".to_string()))
    }

    /// Stop accepting new requests for `analysis_id` and synthesize a
    /// failure reply for every request whose handle was never used, so no
    /// worker is left waiting forever.
    pub fn cancel(&self, analysis_id: AnalysisId) {
        {
            let mut slot = self.slot.lock();
            if matches!(slot.as_ref(), Some(r) if r.analysis_id == analysis_id) {
                *slot = None;
            }
        }
        let mut outstanding = self.outstanding.lock();
        for (_, tx) in outstanding.drain() {
            let _ = tx.send(Response::Error { message: "analysis cancelled".to_string() });
        }
    }
}

impl Default for Boundary {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
#[path = "boundary_tests.rs"]
mod tests;
