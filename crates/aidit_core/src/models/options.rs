//! Closed set of background processing options.

use crate::constants::{
    FIELD_BG_COLOR, FIELD_BG_GRADIENT_END, FIELD_BG_GRADIENT_START, FIELD_BG_IMAGE,
};
use crate::error::ToolError;
use crate::models::{HexColor, InputAsset};

/// How the backend should treat the background of the submitted image.
///
/// Exactly one variant is active, so conflicting option combinations cannot
/// be expressed.
#[derive(Debug, Clone, Default)]
pub enum ProcessingOptions {
    /// Remove the background and leave it transparent.
    #[default]
    Remove,
    /// Replace the background with a solid color.
    SolidColor { color: HexColor },
    /// Replace the background with a two-stop gradient.
    Gradient { start: HexColor, end: HexColor },
    /// Replace the background with another image. The image may still be
    /// missing while the user is configuring the tool.
    CustomImage { background: Option<InputAsset> },
}

/// One multipart field contributed by the active option variant.
#[derive(Debug, Clone)]
pub enum FormField {
    Text { name: &'static str, value: String },
    File { name: &'static str, asset: InputAsset },
}

impl FormField {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }
}

impl ProcessingOptions {
    /// Short mode name used in logs and CLI output.
    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::Remove => "remove",
            Self::SolidColor { .. } => "color",
            Self::Gradient { .. } => "gradient",
            Self::CustomImage { .. } => "image",
        }
    }

    /// `true` for the default, payload-free variant.
    pub fn is_remove(&self) -> bool {
        matches!(self, Self::Remove)
    }

    /// Check that every asset the variant needs is present.
    ///
    /// # Errors
    /// Returns [`ToolError::Validation`] for [`ProcessingOptions::CustomImage`]
    /// without a background image.
    pub fn ensure_complete(&self) -> Result<(), ToolError> {
        match self {
            Self::CustomImage { background: None } => Err(ToolError::validation(
                "Please choose a background image first.",
            )),
            _ => Ok(()),
        }
    }

    /// Multipart fields for the active variant only; the primary `file` part
    /// is not included.
    pub fn form_fields(&self) -> Vec<FormField> {
        match self {
            Self::Remove => Vec::new(),
            Self::SolidColor { color } => vec![FormField::Text {
                name: FIELD_BG_COLOR,
                value: color.to_string(),
            }],
            Self::Gradient { start, end } => vec![
                FormField::Text {
                    name: FIELD_BG_GRADIENT_START,
                    value: start.to_string(),
                },
                FormField::Text {
                    name: FIELD_BG_GRADIENT_END,
                    value: end.to_string(),
                },
            ],
            Self::CustomImage { background } => background
                .iter()
                .map(|asset| FormField::File {
                    name: FIELD_BG_IMAGE,
                    asset: asset.clone(),
                })
                .collect(),
        }
    }
}
