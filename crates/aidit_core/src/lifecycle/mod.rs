//! Tool lifecycle controller.
//!
//! One [`ToolController`] drives a single tool instance through
//! select -> configure -> submit -> preview -> clear. Network work runs on a
//! spawned task; its progress ticks and final outcome come back as
//! [`TransferEvent`]s and are applied on the owner's thread by
//! [`ToolController::poll_events`] or [`ToolController::settle`], so every
//! state change happens in response to one discrete event.

mod state;

pub use state::{RequestState, ToolPhase, TransferEvent};

use crate::error::{PreviewError, ToolError};
use crate::models::{InputAsset, ProcessingOptions, ToolKind};
use crate::object_url::{ObjectUrl, ObjectUrlRegistry};
use crate::preview::PreviewSurface;
use crate::transfer::{ProgressCallback, TransferRequest, TransferStrategy};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver};
use tracing::{debug, error, info, warn};

const MISSING_INPUT_MESSAGE: &str = "Please upload an image first.";
const FALLBACK_RESULT_MIME: &str = "image/png";

struct InFlight {
    id: u64,
    events: UnboundedReceiver<TransferEvent>,
}

/// State machine for one tool instance.
///
/// The controller owns its own [`ObjectUrlRegistry`]; at most one input and
/// one result reference are live at a time, and every reference is released
/// exactly once (on supersession, clear, or drop).
pub struct ToolController<S: TransferStrategy + 'static> {
    tool: ToolKind,
    transfer: Arc<S>,
    runtime: Handle,
    urls: ObjectUrlRegistry,
    input: Option<InputAsset>,
    input_url: Option<ObjectUrl>,
    options: ProcessingOptions,
    result_url: Option<ObjectUrl>,
    phase: ToolPhase,
    request: RequestState,
    progress: u8,
    error: Option<String>,
    preview_open: bool,
    auto_submit: bool,
    labels: (String, String),
    in_flight: Option<InFlight>,
    submissions: u64,
}

impl<S: TransferStrategy + 'static> ToolController<S> {
    /// Create an empty controller.
    ///
    /// # Arguments
    /// - `tool`: Which tool (endpoint, labels, failure message) this drives.
    /// - `transfer`: Strategy used for submissions.
    /// - `runtime`: Runtime that submission tasks are spawned on.
    pub fn new(tool: ToolKind, transfer: Arc<S>, runtime: Handle) -> Self {
        let (original, processed) = tool.preview_labels();
        Self {
            tool,
            transfer,
            runtime,
            urls: ObjectUrlRegistry::new(),
            input: None,
            input_url: None,
            options: ProcessingOptions::default(),
            result_url: None,
            phase: ToolPhase::Empty,
            request: RequestState::Idle,
            progress: 0,
            error: None,
            preview_open: false,
            auto_submit: false,
            labels: (original.to_string(), processed.to_string()),
            in_flight: None,
            submissions: 0,
        }
    }

    /// Submit immediately whenever a file is selected.
    pub fn with_auto_submit(mut self, enabled: bool) -> Self {
        self.auto_submit = enabled;
        self
    }

    /// Override the preview labels.
    pub fn with_preview_labels(
        mut self,
        original: impl Into<String>,
        processed: impl Into<String>,
    ) -> Self {
        self.labels = (original.into(), processed.into());
        self
    }

    /// Select a new input image.
    ///
    /// Any previous input, result, error and options are cleared first, so
    /// the prior display reference is released before the new one is issued.
    ///
    /// # Errors
    /// Returns [`ToolError::Busy`] while a submission is in flight, or any
    /// error from the auto-submit that follows when it is enabled.
    pub fn select_file(&mut self, asset: InputAsset) -> Result<(), ToolError> {
        self.ensure_idle()?;
        self.reset();

        let url = self
            .urls
            .create(asset.bytes().clone(), asset.mime_type());
        debug!(tool = %self.tool, file = asset.name(), bytes = asset.len(), "input selected");
        self.input_url = Some(url);
        self.input = Some(asset);
        self.phase = ToolPhase::Configuring;

        if self.auto_submit {
            self.submit()?;
        }
        Ok(())
    }

    /// Choose how the backend should process the input.
    ///
    /// Does not change the phase, except that a failed or finished tool goes
    /// back to configuring with an idle request.
    ///
    /// # Errors
    /// Returns [`ToolError::Busy`] while a submission is in flight, and
    /// [`ToolError::Validation`] for non-default options on a tool that has
    /// none.
    pub fn set_options(&mut self, options: ProcessingOptions) -> Result<(), ToolError> {
        self.ensure_idle()?;
        if !self.tool.accepts_options() && !options.is_remove() {
            return Err(ToolError::validation(format!(
                "{} has no background options.",
                self.tool.title()
            )));
        }
        self.options = options;
        if matches!(self.phase, ToolPhase::Failed | ToolPhase::Previewing) {
            self.phase = ToolPhase::Configuring;
            self.request = RequestState::Idle;
        }
        Ok(())
    }

    /// Validate preconditions and start a submission.
    ///
    /// On validation failure no request is made, the message is stored as
    /// the inline error, and the phase is left unchanged.
    ///
    /// # Errors
    /// Returns [`ToolError::Busy`] while another submission is in flight and
    /// [`ToolError::Validation`] when the input (or a required background
    /// image) is missing.
    pub fn submit(&mut self) -> Result<(), ToolError> {
        self.ensure_idle()?;
        let Some(asset) = self.input.clone() else {
            return Err(self.reject(ToolError::validation(MISSING_INPUT_MESSAGE)));
        };
        let options = if self.tool.accepts_options() {
            if let Err(err) = self.options.ensure_complete() {
                return Err(self.reject(err));
            }
            self.options.clone()
        } else {
            ProcessingOptions::Remove
        };

        let stale_result = self.result_url.take();
        self.release(stale_result);
        self.error = None;
        self.progress = 0;
        self.request = RequestState::Uploading(0);
        self.phase = ToolPhase::Submitting;
        self.preview_open = false;
        self.submissions += 1;

        let id = self.submissions;
        info!(
            tool = %self.tool,
            submission = id,
            file = asset.name(),
            mode = options.mode_name(),
            "submission started"
        );

        let (tx, events) = mpsc::unbounded_channel();
        let progress_tx = tx.clone();
        let progress: ProgressCallback = Arc::new(move |percent| {
            let _ = progress_tx.send(TransferEvent::Progress(percent));
        });
        let request = TransferRequest {
            tool: self.tool,
            asset,
            options,
        };
        let transfer = Arc::clone(&self.transfer);
        self.runtime.spawn(async move {
            let outcome = transfer.submit(request, progress).await;
            let _ = tx.send(TransferEvent::Finished(outcome));
        });
        self.in_flight = Some(InFlight { id, events });
        Ok(())
    }

    /// Apply every event that has already arrived without waiting.
    ///
    /// # Returns
    /// `true` when at least one event was applied.
    pub fn poll_events(&mut self) -> bool {
        let mut applied = false;
        loop {
            let Some(in_flight) = self.in_flight.as_mut() else {
                return applied;
            };
            let received = in_flight.events.try_recv();
            match received {
                Ok(event) => {
                    self.apply(event);
                    applied = true;
                }
                Err(TryRecvError::Empty) => return applied,
                Err(TryRecvError::Disconnected) => {
                    self.abandoned();
                    return true;
                }
            }
        }
    }

    /// Wait until the in-flight submission (if any) resolves.
    ///
    /// # Returns
    /// The phase after the submission succeeded or failed.
    pub async fn settle(&mut self) -> ToolPhase {
        while let Some(in_flight) = self.in_flight.as_mut() {
            let received = in_flight.events.recv().await;
            match received {
                Some(event) => self.apply(event),
                None => self.abandoned(),
            }
        }
        self.phase
    }

    /// Return to [`ToolPhase::Empty`], releasing every display reference.
    ///
    /// # Errors
    /// Returns [`ToolError::Busy`] while a submission is in flight; there is
    /// no cancellation.
    pub fn clear(&mut self) -> Result<(), ToolError> {
        self.ensure_idle()?;
        self.reset();
        debug!(tool = %self.tool, "tool cleared");
        Ok(())
    }

    /// Show the preview again. Has no effect without a result.
    ///
    /// # Returns
    /// Whether the preview is now visible.
    pub fn open_preview(&mut self) -> bool {
        self.preview_open = self.result_url.is_some();
        self.preview_open
    }

    /// Hide the preview. Underlying state is left untouched.
    pub fn close_preview(&mut self) {
        self.preview_open = false;
    }

    /// Side-by-side view of the current input and result.
    pub fn preview(&self) -> Option<PreviewSurface> {
        let processed = self.result_url.clone()?;
        Some(
            PreviewSurface::new(self.input_url.clone(), Some(processed))
                .with_labels(self.labels.0.clone(), self.labels.1.clone()),
        )
    }

    /// Persist the processed result into `dir` using the fixed download name.
    ///
    /// # Errors
    /// Returns [`PreviewError::NothingToDownload`] without a result, or an IO
    /// error from writing the file.
    pub fn download_result(&self, dir: &Path) -> Result<PathBuf, PreviewError> {
        let preview = self.preview().ok_or(PreviewError::NothingToDownload)?;
        preview.download(&self.urls, dir)
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn phase(&self) -> ToolPhase {
        self.phase
    }

    pub fn request_state(&self) -> &RequestState {
        &self.request
    }

    /// Last reported upload percentage for the current or last request.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Inline error message, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn input(&self) -> Option<&InputAsset> {
        self.input.as_ref()
    }

    pub fn input_url(&self) -> Option<&ObjectUrl> {
        self.input_url.as_ref()
    }

    pub fn result_url(&self) -> Option<&ObjectUrl> {
        self.result_url.as_ref()
    }

    pub fn options(&self) -> &ProcessingOptions {
        &self.options
    }

    pub fn preview_visible(&self) -> bool {
        self.preview_open
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether the submit affordance should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.is_busy() && self.input.is_some()
    }

    /// Display references owned by this tool.
    pub fn urls(&self) -> &ObjectUrlRegistry {
        &self.urls
    }

    fn ensure_idle(&self) -> Result<(), ToolError> {
        if self.is_busy() {
            return Err(ToolError::Busy);
        }
        Ok(())
    }

    fn reject(&mut self, err: ToolError) -> ToolError {
        warn!(tool = %self.tool, "submit rejected: {}", err);
        self.error = Some(err.to_string());
        if matches!(self.request, RequestState::Failed(_)) {
            self.request = RequestState::Idle;
        }
        err
    }

    fn apply(&mut self, event: TransferEvent) {
        match event {
            TransferEvent::Progress(percent) => {
                if !matches!(self.request, RequestState::Uploading(_)) {
                    return;
                }
                self.progress = self.progress.max(percent.min(100));
                self.request = if self.progress >= 100 {
                    RequestState::AwaitingResponse
                } else {
                    RequestState::Uploading(self.progress)
                };
            }
            TransferEvent::Finished(outcome) => {
                let id = self.in_flight.take().map(|in_flight| in_flight.id);
                match outcome {
                    Ok(body) => self.succeeded(id, body),
                    Err(err) => {
                        warn!(tool = %self.tool, submission = ?id, "submission failed: {}", err);
                        self.failed();
                    }
                }
            }
        }
    }

    fn succeeded(&mut self, id: Option<u64>, body: Bytes) {
        let previous = self.result_url.take();
        self.release(previous);
        let mime_type = infer::get(&body)
            .map(|kind| kind.mime_type())
            .unwrap_or(FALLBACK_RESULT_MIME);
        info!(
            tool = %self.tool,
            submission = ?id,
            bytes = body.len(),
            "submission succeeded"
        );
        self.result_url = Some(self.urls.create(body, mime_type));
        self.request = RequestState::Succeeded;
        self.phase = ToolPhase::Previewing;
        self.preview_open = true;
    }

    fn failed(&mut self) {
        let message = self.tool.failure_message().to_string();
        self.error = Some(message.clone());
        self.request = RequestState::Failed(message);
        self.phase = ToolPhase::Failed;
    }

    /// The submission task went away without reporting an outcome.
    fn abandoned(&mut self) {
        let id = self.in_flight.take().map(|in_flight| in_flight.id);
        error!(tool = %self.tool, submission = ?id, "submission ended without an outcome");
        self.failed();
    }

    fn reset(&mut self) {
        let input_url = self.input_url.take();
        let result_url = self.result_url.take();
        self.release(input_url);
        self.release(result_url);
        self.input = None;
        self.options = ProcessingOptions::default();
        self.error = None;
        self.progress = 0;
        self.request = RequestState::Idle;
        self.phase = ToolPhase::Empty;
        self.preview_open = false;
    }

    fn release(&mut self, url: Option<ObjectUrl>) {
        let Some(url) = url else {
            return;
        };
        if let Err(err) = self.urls.revoke(&url) {
            error!(tool = %self.tool, "display reference defect: {}", err);
        }
    }
}

impl<S: TransferStrategy + 'static> Drop for ToolController<S> {
    fn drop(&mut self) {
        let input_url = self.input_url.take();
        let result_url = self.result_url.take();
        self.release(input_url);
        self.release(result_url);
    }
}
