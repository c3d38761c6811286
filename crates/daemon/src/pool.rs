//! Worker pool supervisor (C4, §4.4): starts N sibling worker processes,
//! holds each one's stdin open as a deadman switch, and drains stdout into
//! logs tagged by worker index.
//!
//! Process-wide singleton per Design Note 9: owned by a supervisor value
//! the embedder creates once and passes into each analysis, rather than
//! living on mutable process-global state.

use ac_core::{CoordinatorError, WorkerIndex};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tracing::{info, warn};

/// Arguments the worker process contract requires (§6: Worker process
/// contract).
pub struct WorkerLaunch {
    /// Path to the worker executable.
    pub command: PathBuf,
    /// `--work-announce <address>`.
    pub announce_addr: String,
    /// `--plugins-directory <path>`, if configured.
    pub plugins_dir: Option<PathBuf>,
    /// Environment additions layered onto the coordinator's own
    /// environment (plugin discovery paths).
    pub env: Vec<(String, String)>,
    /// Base debug port; worker *i* is launched with this value plus *i* in
    /// `AC_WORKER_DEBUG_PORT`, if configured (§6: per-worker debug-port
    /// offset).
    pub debug_port_base: Option<u16>,
}

struct WorkerHandle {
    index: WorkerIndex,
    stdin: Option<ChildStdin>,
    child: Child,
}

/// `start`/`stop` the pool of sibling worker processes. `start` is
/// idempotent — a non-empty pool is left untouched.
pub struct WorkerPool {
    workers: Mutex<Vec<WorkerHandle>>,
}

impl WorkerPool {
    pub fn new() -> Self {
        Self { workers: Mutex::new(Vec::new()) }
    }

    pub fn is_empty(&self) -> bool {
        self.workers.lock().is_empty()
    }

    /// Start `n` workers per `launch`. No-op if the pool is already
    /// populated — this coordinator does not attempt worker reuse across
    /// runs, to avoid recovery complexity after cancellation.
    pub async fn start(&self, n: u32, launch: &WorkerLaunch) -> Result<(), CoordinatorError> {
        if !self.is_empty() {
            return Ok(());
        }

        let mut started = Vec::with_capacity(n as usize);
        for i in 0..n {
            let index = WorkerIndex(i);
            let mut cmd = Command::new(&launch.command);
            cmd.arg("--work-announce").arg(&launch.announce_addr);
            if let Some(dir) = &launch.plugins_dir {
                cmd.arg("--plugins-directory").arg(dir);
            }
            for (key, value) in &launch.env {
                cmd.env(key, value);
            }
            if let Some(base) = launch.debug_port_base {
                cmd.env("AC_WORKER_DEBUG_PORT", (base + i as u16).to_string());
            }
            cmd.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped());

            let mut child = cmd
                .spawn()
                .map_err(|e| CoordinatorError::Transport(format!("spawn worker {index}: {e}")))?;

            let stdin = child.stdin.take();
            let stdout = child.stdout.take();
            let stderr = child.stderr.take();

            if let Some(stdout) = stdout {
                spawn_drain_task(index, "stdout", stdout);
            }
            if let Some(stderr) = stderr {
                spawn_drain_task(index, "stderr", stderr);
            }

            started.push(WorkerHandle { index, stdin, child });
        }

        *self.workers.lock() = started;
        Ok(())
    }

    /// Close every stored stdin handle, wait for each child to exit, and
    /// clear the pool.
    pub async fn stop(&self) {
        let handles = std::mem::take(&mut *self.workers.lock());
        for mut handle in handles {
            drop(handle.stdin.take());
            match handle.child.wait().await {
                Ok(status) => info!(worker = %handle.index, %status, "worker exited"),
                Err(e) => warn!(worker = %handle.index, error = %e, "failed to reap worker"),
            }
        }
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new()
    }
}

fn spawn_drain_task<R>(index: WorkerIndex, stream: &'static str, reader: R)
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => info!(worker = %index, %stream, "{line}"),
                Ok(None) => break,
                Err(e) => {
                    warn!(worker = %index, %stream, error = %e, "error reading worker output");
                    break;
                }
            }
        }
    });
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
