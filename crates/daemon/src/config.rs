//! Layered configuration (§6.2): compiled defaults → optional TOML file →
//! `AC_`-prefixed environment overrides, validated once at startup.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to parse config file {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Resolved, validated coordinator configuration. Built once at startup and
/// passed down as an immutable struct — nothing re-reads the environment
/// after `Config::load`.
#[derive(Debug, Clone)]
pub struct Config {
    pub worker_count: u32,
    pub announce_addr: String,
    /// Address the out-of-process control surface (§6.1: start/cancel/
    /// pause/resume/status) listens on. Separate from `announce_addr`
    /// (the worker-facing transport) even though both use the same
    /// length-prefixed JSON framing.
    pub control_addr: String,
    pub ipc_timeout: Duration,
    pub plugins_dir: Option<PathBuf>,
    pub received_queue_cap: usize,
    /// Worker executable to launch (§6: Worker process contract). Resolved
    /// through `PATH` by default — deployments that vendor a specific
    /// worker binary override this with an absolute path.
    pub worker_command: PathBuf,
    /// Base port for the per-worker debug-port offset (§6); worker *i*
    /// gets `debug_port_base + i`. Unset by default — debugging is opt-in.
    pub debug_port_base: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker_count: 4,
            announce_addr: "127.0.0.1:0".to_string(),
            control_addr: "127.0.0.1:0".to_string(),
            ipc_timeout: Duration::from_secs(5),
            plugins_dir: None,
            received_queue_cap: 10,
            worker_command: PathBuf::from("analysis-worker"),
            debug_port_base: None,
        }
    }
}

/// Shape of the optional TOML config file — every field optional, so a file
/// may override as little or as much of the compiled defaults as it likes.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    worker_count: Option<u32>,
    announce_addr: Option<String>,
    control_addr: Option<String>,
    ipc_timeout_ms: Option<u64>,
    plugins_dir: Option<PathBuf>,
    received_queue_cap: Option<usize>,
    worker_command: Option<PathBuf>,
    debug_port_base: Option<u16>,
}

impl Config {
    /// Load configuration: compiled defaults, then `path` if given and
    /// present, then `AC_*` environment variables, then validate.
    pub fn load(path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = path {
            if path.exists() {
                let text = std::fs::read_to_string(path)
                    .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
                let file: FileConfig = toml::from_str(&text)
                    .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
                config.apply_file(file);
            }
        }

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(v) = file.worker_count {
            self.worker_count = v;
        }
        if let Some(v) = file.announce_addr {
            self.announce_addr = v;
        }
        if let Some(v) = file.control_addr {
            self.control_addr = v;
        }
        if let Some(v) = file.ipc_timeout_ms {
            self.ipc_timeout = Duration::from_millis(v);
        }
        if let Some(v) = file.plugins_dir {
            self.plugins_dir = Some(v);
        }
        if let Some(v) = file.received_queue_cap {
            self.received_queue_cap = v;
        }
        if let Some(v) = file.worker_command {
            self.worker_command = v;
        }
        if let Some(v) = file.debug_port_base {
            self.debug_port_base = Some(v);
        }
    }

    fn apply_env(&mut self) {
        if let Some(v) = env_parsed::<u32>("AC_WORKER_COUNT") {
            self.worker_count = v;
        }
        if let Ok(v) = std::env::var("AC_ANNOUNCE_ADDR") {
            self.announce_addr = v;
        }
        if let Ok(v) = std::env::var("AC_CONTROL_ADDR") {
            self.control_addr = v;
        }
        if let Some(v) = env_parsed::<u64>("AC_IPC_TIMEOUT_MS") {
            self.ipc_timeout = Duration::from_millis(v);
        }
        if let Ok(v) = std::env::var("AC_PLUGINS_DIR") {
            self.plugins_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = env_parsed::<usize>("AC_RECEIVED_QUEUE_CAP") {
            self.received_queue_cap = v;
        }
        if let Ok(v) = std::env::var("AC_WORKER_COMMAND") {
            self.worker_command = PathBuf::from(v);
        }
        if let Some(v) = env_parsed::<u16>("AC_WORKER_DEBUG_PORT_BASE") {
            self.debug_port_base = Some(v);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::Invalid {
                field: "worker_count",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.received_queue_cap == 0 {
            return Err(ConfigError::Invalid {
                field: "received_queue_cap",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
