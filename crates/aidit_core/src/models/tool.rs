//! Tool descriptors (endpoint, labels, messages).

use crate::constants::{DEFAULT_ORIGINAL_LABEL, DEFAULT_PROCESSED_LABEL};
use serde::Serialize;
use std::fmt;

/// The image tools backed by the remote processing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    /// One-shot background removal.
    QuickRemove,
    /// Background removal or replacement (color, gradient, image).
    Background,
    /// AI upscaling, up to 4x.
    Enhance,
}

impl ToolKind {
    /// URL path segments of the tool's endpoint, relative to the API base.
    pub fn endpoint_segments(self) -> [&'static str; 3] {
        let name = match self {
            Self::QuickRemove => "remove-background",
            Self::Background => "process-background",
            Self::Enhance => "enhance-image",
        };
        ["api", "tools", name]
    }

    /// Whether the tool forwards [`crate::ProcessingOptions`] to the backend.
    pub fn accepts_options(self) -> bool {
        matches!(self, Self::Background)
    }

    /// User-facing message shown when a submission fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::QuickRemove | Self::Background => "Image processing failed. Please try again.",
            Self::Enhance => {
                "Image processing failed. The model is heavy, please try a smaller image or try again."
            }
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::QuickRemove => "AI Background Remover",
            Self::Background => "AI Background Studio",
            Self::Enhance => "AI Image Enhancer (4x)",
        }
    }

    /// Labels for the original and processed sides of the preview.
    pub fn preview_labels(self) -> (&'static str, &'static str) {
        match self {
            Self::Enhance => (DEFAULT_ORIGINAL_LABEL, "Enhanced (4x)"),
            Self::QuickRemove | Self::Background => {
                (DEFAULT_ORIGINAL_LABEL, DEFAULT_PROCESSED_LABEL)
            }
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::QuickRemove => "quick-remove",
            Self::Background => "background",
            Self::Enhance => "enhance",
        };
        f.write_str(name)
    }
}
