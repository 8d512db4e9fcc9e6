//! Side-by-side result preview and download.

use crate::constants::{DEFAULT_ORIGINAL_LABEL, DEFAULT_PROCESSED_LABEL, PROCESSED_DOWNLOAD_NAME};
use crate::error::PreviewError;
use crate::object_url::{ObjectUrl, ObjectUrlRegistry};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Original and processed references plus their captions.
///
/// Holds no state of its own; visibility belongs to the owning controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewSurface {
    pub original: Option<ObjectUrl>,
    pub processed: Option<ObjectUrl>,
    pub original_label: String,
    pub processed_label: String,
}

impl PreviewSurface {
    /// Build a preview with the default "Original"/"Processed" labels.
    pub fn new(original: Option<ObjectUrl>, processed: Option<ObjectUrl>) -> Self {
        Self {
            original,
            processed,
            original_label: DEFAULT_ORIGINAL_LABEL.to_string(),
            processed_label: DEFAULT_PROCESSED_LABEL.to_string(),
        }
    }

    pub fn with_labels(
        mut self,
        original_label: impl Into<String>,
        processed_label: impl Into<String>,
    ) -> Self {
        self.original_label = original_label.into();
        self.processed_label = processed_label.into();
        self
    }

    /// Write the processed image to `dir/aidit-processed.png`, creating `dir`
    /// if needed. An existing file with that name is replaced.
    ///
    /// # Returns
    /// The path written.
    ///
    /// # Errors
    /// - [`PreviewError::NothingToDownload`] when there is no processed side.
    /// - [`PreviewError::Released`] when the reference is no longer live.
    /// - [`PreviewError::Io`] when the file cannot be written.
    pub fn download(
        &self,
        registry: &ObjectUrlRegistry,
        dir: &Path,
    ) -> Result<PathBuf, PreviewError> {
        let processed = self
            .processed
            .as_ref()
            .ok_or(PreviewError::NothingToDownload)?;
        let blob = registry.resolve(processed).ok_or(PreviewError::Released)?;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(PROCESSED_DOWNLOAD_NAME);
        std::fs::write(&path, &blob.bytes)?;
        tracing::info!(path = %path.display(), bytes = blob.bytes.len(), "processed image saved");
        Ok(path)
    }
}
