//! State types for the tool lifecycle.

use crate::error::TransferError;
use bytes::Bytes;
use serde::Serialize;

/// Where a tool instance is in its select/submit/preview cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolPhase {
    /// No input selected.
    Empty,
    /// Input selected; options may be changed and a submit issued.
    Configuring,
    /// A submission is in flight.
    Submitting,
    /// A result is available.
    Previewing,
    /// The last submission failed; the user may submit again.
    Failed,
}

/// Progress of the current (or last) request, driving button and progress
/// bar affordances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "detail")]
pub enum RequestState {
    Idle,
    /// Upload in progress, percentage in `0..=100`.
    Uploading(u8),
    /// Upload complete, waiting for the backend to answer.
    AwaitingResponse,
    Succeeded,
    /// User-facing failure message.
    Failed(String),
}

impl RequestState {
    /// `true` while a request is on the wire.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Uploading(_) | Self::AwaitingResponse)
    }
}

/// Messages sent from a submission task back to its owning controller.
#[derive(Debug)]
pub enum TransferEvent {
    Progress(u8),
    Finished(Result<Bytes, TransferError>),
}
