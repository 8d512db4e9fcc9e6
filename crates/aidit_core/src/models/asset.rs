//! User-selected source images.

use crate::constants::ACCEPTED_MIME_TYPES;
use crate::error::ToolError;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::Path;

/// A PNG or JPEG image chosen by the user.
///
/// The bytes are reference-counted, so cloning an asset for a submission does
/// not copy the image.
#[derive(Debug, Clone)]
pub struct InputAsset {
    name: String,
    mime_type: &'static str,
    bytes: Bytes,
    selected_at: DateTime<Utc>,
}

impl InputAsset {
    /// Build an asset from in-memory bytes.
    ///
    /// # Arguments
    /// - `name`: File name shown to the user and sent as the part filename.
    /// - `bytes`: Raw file content.
    ///
    /// # Errors
    /// Returns [`ToolError::Validation`] for empty content or a type other
    /// than PNG/JPEG.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Bytes>) -> Result<Self, ToolError> {
        let name = name.into();
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(ToolError::validation(format!("'{}' is empty.", name)));
        }
        let mime_type = detect_mime_type(&name, &bytes).ok_or_else(|| {
            ToolError::validation(format!(
                "'{}' is not a supported image. Please choose a PNG or JPEG file.",
                name
            ))
        })?;
        Ok(Self {
            name,
            mime_type,
            bytes,
            selected_at: Utc::now(),
        })
    }

    /// Read an asset from disk.
    ///
    /// # Errors
    /// Returns [`ToolError::Io`] when the file cannot be read, otherwise the
    /// same validation errors as [`InputAsset::from_bytes`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ToolError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());
        Self::from_bytes(name, bytes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always `false`; empty files are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn selected_at(&self) -> DateTime<Utc> {
        self.selected_at
    }
}

/// Sniff the content type, falling back to the extension when the magic bytes
/// are not recognized. Only accepted image types are returned.
fn detect_mime_type(name: &str, bytes: &[u8]) -> Option<&'static str> {
    let sniffed = infer::get(bytes).map(|kind| kind.mime_type());
    let mime_type = match sniffed {
        Some(mime_type) => mime_type,
        None => mime_type_from_extension(name)?,
    };
    ACCEPTED_MIME_TYPES
        .iter()
        .copied()
        .find(|accepted| *accepted == mime_type)
}

fn mime_type_from_extension(name: &str) -> Option<&'static str> {
    let extension = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}
