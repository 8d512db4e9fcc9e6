//! reqwest-backed multipart transfer.

use super::{ProgressCallback, ProgressTracker, TransferRequest, TransferStrategy};
use crate::config::Config;
use crate::constants::FIELD_FILE;
use crate::error::TransferError;
use crate::models::{FormField, InputAsset, ToolKind};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Url};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Posts images to the processing backend as `multipart/form-data`.
///
/// Binary parts are streamed in `upload_chunk_size` pieces so upload
/// progress can be reported while the request body is written.
#[derive(Debug, Clone)]
pub struct HttpTransfer {
    client: Client,
    api_url: Url,
    chunk_size: usize,
}

impl HttpTransfer {
    /// Build a transfer client from explicit configuration.
    ///
    /// # Errors
    /// Returns [`TransferError::InvalidUrl`] when `config.api_url` cannot act
    /// as a base URL, or [`TransferError::Request`] when the HTTP client
    /// cannot be constructed.
    pub fn new(config: &Config) -> Result<Self, TransferError> {
        let api_url = Url::parse(&config.api_url)
            .map_err(|err| TransferError::InvalidUrl(format!("'{}': {}", config.api_url, err)))?;
        if api_url.cannot_be_a_base() {
            return Err(TransferError::InvalidUrl(format!(
                "'{}' cannot be used as an API base",
                config.api_url
            )));
        }
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            api_url,
            chunk_size: config.upload_chunk_size.max(1),
        })
    }

    /// Absolute endpoint URL for `tool`, appended to any base path.
    ///
    /// # Errors
    /// Returns [`TransferError::InvalidUrl`] if the base URL has no path.
    pub fn endpoint(&self, tool: ToolKind) -> Result<Url, TransferError> {
        let mut url = self.api_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                TransferError::InvalidUrl(format!(
                    "'{}' cannot be used as an API base",
                    self.api_url
                ))
            })?;
            path.pop_if_empty();
            for segment in tool.endpoint_segments() {
                path.push(segment);
            }
        }
        Ok(url)
    }

    fn file_part(
        &self,
        asset: &InputAsset,
        tracker: &Arc<ProgressTracker>,
    ) -> Result<Part, TransferError> {
        let chunks = chunk_bytes(asset.bytes(), self.chunk_size);
        let tracker = Arc::clone(tracker);
        let body = stream::iter(chunks).map(move |chunk| {
            tracker.advance(chunk.len());
            Ok::<Bytes, std::io::Error>(chunk)
        });
        let part = Part::stream_with_length(Body::wrap_stream(body), asset.len() as u64)
            .file_name(asset.name().to_string())
            .mime_str(asset.mime_type())?;
        Ok(part)
    }

    fn build_form(
        &self,
        request: &TransferRequest,
        tracker: &Arc<ProgressTracker>,
    ) -> Result<Form, TransferError> {
        let mut form = Form::new().part(FIELD_FILE, self.file_part(&request.asset, tracker)?);
        for field in request.option_fields() {
            form = match field {
                FormField::Text { name, value } => form.text(name, value),
                FormField::File { name, asset } => form.part(name, self.file_part(&asset, tracker)?),
            };
        }
        Ok(form)
    }
}

fn chunk_bytes(bytes: &Bytes, chunk_size: usize) -> Vec<Bytes> {
    (0..bytes.len())
        .step_by(chunk_size)
        .map(|start| bytes.slice(start..(start + chunk_size).min(bytes.len())))
        .collect()
}

#[async_trait]
impl TransferStrategy for HttpTransfer {
    async fn submit(
        &self,
        request: TransferRequest,
        progress: ProgressCallback,
    ) -> Result<Bytes, TransferError> {
        let url = self.endpoint(request.tool)?;
        let tracker = Arc::new(ProgressTracker::new(request.upload_len(), progress));
        let form = self.build_form(&request, &tracker)?;

        info!(
            tool = %request.tool,
            mode = request.options.mode_name(),
            bytes = tracker.total(),
            "submitting image to {}",
            url
        );
        let started = Instant::now();
        let response = self.client.post(url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(tool = %request.tool, status = status.as_u16(), "backend rejected image");
            return Err(TransferError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        debug!(
            tool = %request.tool,
            response_bytes = body.len(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "backend returned processed image"
        );
        Ok(body)
    }
}
