//! Error types for validation, transfer and display-reference failures.
use thiserror::Error;

/// Failure of a single HTTP exchange with the processing backend.
///
/// Every variant collapses to the same user-facing retry prompt; the detail is
/// kept for logs only.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Backend returned status {status}")]
    Status { status: u16 },

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

/// Misuse of a display reference. Occurring at all is a programming defect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    #[error("Display reference {0} was never issued")]
    Unknown(String),

    #[error("Display reference {0} was already released")]
    AlreadyReleased(String),
}

/// Failure to persist a processed result from the preview surface.
#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("No processed result to download")]
    NothingToDownload,

    #[error("Processed result is no longer available")]
    Released,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by tool lifecycle operations.
#[derive(Error, Debug)]
pub enum ToolError {
    /// A precondition failed before any network call was made.
    #[error("{0}")]
    Validation(String),

    /// A submission is already in flight for this tool.
    #[error("A submission is already in progress")]
    Busy,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    /// Build a validation error from any displayable message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
