//! ac-daemon: the analysis run coordinator.
//!
//! Wires together the measurement store adapter (`ac-store`), the wire
//! protocol (`ac-wire`), and the domain types (`ac-core`) into the running
//! coordinator's components: the message boundary (C1), the announcer
//! (C2), the worker pool supervisor (C4), the job planner (C5), the job
//! server (C6), and the interface loop (C7).
//!
//! The `acd` binary (`src/bin/acd.rs`) is a thin host around this library —
//! everything an embedder needs to drive an analysis lives here as a
//! reusable API.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod announcer;
pub mod boundary;
pub mod config;
pub mod event;
pub mod interface;
pub mod merge;
pub mod planner;
pub mod pool;
pub mod server;

pub use announcer::{Announcement, Announcer};
pub use boundary::{Boundary, Inbound, ReplyHandle};
pub use config::{Config, ConfigError};
pub use event::{Event, EventSink};
pub use interface::InterfaceLoop;
pub use planner::{plan, Window};
pub use pool::{WorkerLaunch, WorkerPool};
pub use server::{new_job_server, FinishedEntry, InterfaceChannels, JobServer, ReceivedEntry};
