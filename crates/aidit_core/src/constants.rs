//! Shared constants used across AIdit crates.

/// Default base URL of the image-processing backend.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Default request timeout in seconds. Upscaling large images is slow.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default chunk size used when streaming binary parts (drives progress ticks).
pub const DEFAULT_UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Fixed filename used when persisting a processed result.
pub const PROCESSED_DOWNLOAD_NAME: &str = "aidit-processed.png";

/// Default label for the left-hand side of a preview.
pub const DEFAULT_ORIGINAL_LABEL: &str = "Original";
/// Default label for the right-hand side of a preview.
pub const DEFAULT_PROCESSED_LABEL: &str = "Processed";

/// MIME types accepted at file selection.
pub const ACCEPTED_MIME_TYPES: [&str; 2] = ["image/png", "image/jpeg"];

/// Multipart field carrying the primary image.
pub const FIELD_FILE: &str = "file";
/// Multipart field carrying a solid background color.
pub const FIELD_BG_COLOR: &str = "bg_color";
/// Multipart field carrying the gradient start color.
pub const FIELD_BG_GRADIENT_START: &str = "bg_gradient_start";
/// Multipart field carrying the gradient end color.
pub const FIELD_BG_GRADIENT_END: &str = "bg_gradient_end";
/// Multipart field carrying a replacement background image.
pub const FIELD_BG_IMAGE: &str = "bg_image";
