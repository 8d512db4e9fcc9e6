//! Multipart transfer to the remote processing service.
//!
//! [`TransferStrategy`] is the seam between the lifecycle controller and the
//! network: one method that uploads an asset with its options and yields the
//! processed image bytes. [`HttpTransfer`] is the production implementation.

mod http;
mod progress;

pub use http::HttpTransfer;
pub use progress::{upload_percent, ProgressTracker};

use crate::error::TransferError;
use crate::models::{FormField, InputAsset, ProcessingOptions, ToolKind};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// Receives upload progress as an integer percentage in `0..=100`.
pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;

/// Everything needed for one submission.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub tool: ToolKind,
    pub asset: InputAsset,
    pub options: ProcessingOptions,
}

impl TransferRequest {
    /// Extra multipart fields sent with the primary file. Tools without
    /// options never send any.
    pub fn option_fields(&self) -> Vec<FormField> {
        if self.tool.accepts_options() {
            self.options.form_fields()
        } else {
            Vec::new()
        }
    }

    /// Total binary payload size, used as the progress denominator.
    pub fn upload_len(&self) -> u64 {
        let extra: usize = self
            .option_fields()
            .iter()
            .map(|field| match field {
                FormField::File { asset, .. } => asset.len(),
                FormField::Text { .. } => 0,
            })
            .sum();
        (self.asset.len() + extra) as u64
    }
}

/// Uploads an asset to a processing backend and returns the processed image.
#[async_trait]
pub trait TransferStrategy: Send + Sync {
    /// Submit once. No retries; the caller decides whether to try again.
    ///
    /// # Returns
    /// The opaque response body on a 2xx response.
    ///
    /// # Errors
    /// Returns [`TransferError`] for connection failures, timeouts, non-2xx
    /// statuses and unreadable bodies.
    async fn submit(
        &self,
        request: TransferRequest,
        progress: ProgressCallback,
    ) -> Result<Bytes, TransferError>;
}
