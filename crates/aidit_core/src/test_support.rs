//! Shared test-only helpers for aidit_core.

use crate::error::TransferError;
use crate::models::{InputAsset, ProcessingOptions, ToolKind};
use crate::transfer::{ProgressCallback, TransferRequest, TransferStrategy};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Minimal bytes that sniff as PNG.
pub(crate) const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDRfake-png-body";
/// Minimal bytes that sniff as JPEG.
pub(crate) const JPEG_BYTES: &[u8] = b"\xFF\xD8\xFF\xE0\x00\x10JFIFfake-jpeg-body";

pub(crate) fn png_asset(name: &str) -> InputAsset {
    InputAsset::from_bytes(name, PNG_BYTES.to_vec()).expect("png asset")
}

pub(crate) fn jpeg_asset(name: &str) -> InputAsset {
    InputAsset::from_bytes(name, JPEG_BYTES.to_vec()).expect("jpeg asset")
}

/// What the scripted strategy observed for one submission.
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub tool: ToolKind,
    pub asset_name: String,
    pub options: ProcessingOptions,
}

/// Scripted response for one submission.
pub(crate) enum Scripted {
    Succeed {
        progress: Vec<u8>,
        body: &'static [u8],
    },
    Fail {
        progress: Vec<u8>,
        status: u16,
    },
}

/// In-memory [`TransferStrategy`] replaying scripted outcomes in order.
///
/// When built with [`ScriptedTransfer::gated`], each submission waits for
/// [`ScriptedTransfer::release`] after reporting progress, so tests can
/// observe the in-flight state.
#[derive(Default)]
pub(crate) struct ScriptedTransfer {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedTransfer {
    pub(crate) fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    pub(crate) fn gated(script: Vec<Scripted>) -> Self {
        Self {
            gate: Some(Arc::new(Notify::new())),
            ..Self::new(script)
        }
    }

    pub(crate) fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl TransferStrategy for ScriptedTransfer {
    async fn submit(
        &self,
        request: TransferRequest,
        progress: ProgressCallback,
    ) -> Result<Bytes, TransferError> {
        self.calls.lock().expect("calls lock").push(RecordedCall {
            tool: request.tool,
            asset_name: request.asset.name().to_string(),
            options: request.options.clone(),
        });
        let next = self.script.lock().expect("script lock").pop_front();
        let (ticks, outcome) = match next {
            Some(Scripted::Succeed { progress, body }) => {
                (progress, Ok(Bytes::from_static(body)))
            }
            Some(Scripted::Fail { progress, status }) => {
                (progress, Err(TransferError::Status { status }))
            }
            None => panic!("scripted transfer has no outcome left"),
        };
        for tick in ticks {
            progress(tick);
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        outcome
    }
}

/// One multipart field captured by [`MockBackend`].
#[derive(Debug, Clone)]
pub(crate) struct CapturedField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// One request captured by [`MockBackend`].
#[derive(Debug, Clone)]
pub(crate) struct CapturedRequest {
    pub tool: String,
    pub fields: Vec<CapturedField>,
}

impl CapturedRequest {
    pub(crate) fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name.as_str()).collect()
    }

    pub(crate) fn field(&self, name: &str) -> Option<&CapturedField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub(crate) fn text(&self, name: &str) -> Option<String> {
        self.field(name)
            .map(|field| String::from_utf8_lossy(&field.data).to_string())
    }
}

struct MockState {
    status: axum::http::StatusCode,
    body: Bytes,
    requests: Mutex<Vec<CapturedRequest>>,
}

/// Processing backend stand-in bound to an ephemeral local port.
pub(crate) struct MockBackend {
    pub base_url: String,
    state: Arc<MockState>,
    server: tokio::task::JoinHandle<()>,
}

impl MockBackend {
    /// Start a backend that answers every tool endpoint with `status`/`body`.
    pub(crate) async fn start(status: u16, body: &'static [u8]) -> Self {
        use axum::extract::{Multipart, Path, State};
        use axum::response::IntoResponse;
        use axum::routing::post;

        async fn handle(
            State(state): State<Arc<MockState>>,
            Path(tool): Path<String>,
            mut multipart: Multipart,
        ) -> axum::response::Response {
            let mut fields = Vec::new();
            while let Ok(Some(field)) = multipart.next_field().await {
                let name = field.name().unwrap_or_default().to_string();
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.unwrap_or_default();
                fields.push(CapturedField {
                    name,
                    file_name,
                    content_type,
                    data,
                });
            }
            state
                .requests
                .lock()
                .expect("requests lock")
                .push(CapturedRequest { tool, fields });
            (state.status, state.body.clone()).into_response()
        }

        let state = Arc::new(MockState {
            status: axum::http::StatusCode::from_u16(status).expect("status"),
            body: Bytes::from_static(body),
            requests: Mutex::new(Vec::new()),
        });
        let app = axum::Router::new()
            .route("/api/tools/:tool", post(handle))
            .with_state(Arc::clone(&state));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend addr");
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self {
            base_url: format!("http://{}", addr),
            state,
            server,
        }
    }

    pub(crate) fn requests(&self) -> Vec<CapturedRequest> {
        self.state.requests.lock().expect("requests lock").clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}
