//! Root crate facade for the AIdit image tools.

pub use aidit_core::{
    config, constants, error, lifecycle, models, object_url, preview, transfer, Config,
    HexColor, HttpTransfer, InputAsset, ObjectUrl, ObjectUrlRegistry, PreviewSurface,
    ProcessingOptions, RequestState, ToolController, ToolError, ToolKind, ToolPhase,
    TransferError, TransferStrategy,
};
