//! IPC protocol between the coordinator and its workers (and, over the
//! same framing, an out-of-process embedder's control surface).
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod control;
mod request;
mod response;
mod wire;

pub use control::{ControlRequest, ControlResponse};
pub use request::{ModulePayload, Request};
pub use response::Response;
pub use wire::{decode, encode, read_message, read_request, write_message, write_response};
pub use wire::{ProtocolError, MAX_FRAME_BYTES};

#[cfg(test)]
mod property_tests;
