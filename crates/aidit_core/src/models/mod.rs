//! Data models for tool inputs, processing options and tool descriptors.

/// User-selected source images.
pub mod asset;
/// Validated hex color values.
pub mod color;
/// Closed set of background processing options.
pub mod options;
/// Tool descriptors (endpoint, labels, messages).
pub mod tool;

pub use asset::InputAsset;
pub use color::HexColor;
pub use options::{FormField, ProcessingOptions};
pub use tool::ToolKind;
