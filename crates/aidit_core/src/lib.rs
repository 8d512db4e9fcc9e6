//! Core library for AIdit (assets, transfer client, tool lifecycle, preview).

/// Configuration loading and defaults.
pub mod config;
/// Shared constants used across AIdit crates.
pub mod constants;
/// Error types for validation, transfer and display-reference failures.
pub mod error;
/// Tool lifecycle controller (select, configure, submit, preview, clear).
pub mod lifecycle;
/// Input assets, processing options and tool descriptors.
pub mod models;
/// Revocable display references for binary blobs.
pub mod object_url;
/// Side-by-side result preview and download.
pub mod preview;
/// Multipart transfer to the remote processing service.
pub mod transfer;

#[cfg(test)]
pub(crate) mod env;
#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use constants::{
    DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_UPLOAD_CHUNK_SIZE, PROCESSED_DOWNLOAD_NAME,
};
pub use error::{PreviewError, ResourceError, ToolError, TransferError};
pub use lifecycle::{RequestState, ToolController, ToolPhase};
pub use models::{HexColor, InputAsset, ProcessingOptions, ToolKind};
pub use object_url::{ObjectUrl, ObjectUrlRegistry};
pub use preview::PreviewSurface;
pub use transfer::{HttpTransfer, ProgressCallback, TransferRequest, TransferStrategy};
