//! OCR service: send a built request and parse the response.
//!
//! This is the only stage with network I/O. It is intentionally thin: one
//! POST per call, a fixed timeout, no retry. Any failure is returned to the
//! caller, which decides whether to try again.
//!
//! [`OcrService`] is the seam between the client and the transport. The
//! production implementation is [`ClovaHttpService`]; tests and embedders can
//! supply their own through [`crate::config::OcrConfigBuilder::service`].

use crate::config::OcrConfig;
use crate::error::ClovaOcrError;
use crate::pipeline::request::OcrRequest;
use crate::response::OcrResponse;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Header carrying the domain secret.
pub const SECRET_HEADER: &str = "X-OCR-SECRET";

/// Longest slice of an error body kept in [`ClovaOcrError::ApiError`].
const MAX_ERROR_BODY: usize = 512;

/// Something that turns an [`OcrRequest`] into an [`OcrResponse`].
#[async_trait]
pub trait OcrService: Send + Sync {
    async fn recognize(&self, request: OcrRequest) -> Result<OcrResponse, ClovaOcrError>;
}

/// CLOVA OCR over HTTPS.
#[derive(Clone)]
pub struct ClovaHttpService {
    client: reqwest::Client,
    api_url: String,
    secret_key: String,
    timeout_secs: u64,
}

impl fmt::Debug for ClovaHttpService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClovaHttpService")
            .field("api_url", &self.api_url)
            .field("secret_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ClovaHttpService {
    pub fn new(
        api_url: impl Into<String>,
        secret_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, ClovaOcrError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ClovaOcrError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_url: api_url.into(),
            secret_key: secret_key.into(),
            timeout_secs,
        })
    }

    pub fn from_config(config: &OcrConfig) -> Result<Self, ClovaOcrError> {
        Self::new(&config.api_url, &config.secret_key, config.timeout_secs)
    }

    fn send_error(&self, e: reqwest::Error) -> ClovaOcrError {
        if e.is_timeout() {
            ClovaOcrError::ApiTimeout {
                secs: self.timeout_secs,
            }
        } else {
            ClovaOcrError::RequestFailed {
                reason: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl OcrService for ClovaHttpService {
    async fn recognize(&self, request: OcrRequest) -> Result<OcrResponse, ClovaOcrError> {
        let start = Instant::now();
        let message = request.message_json()?;
        let request_id = request.message.request_id.clone();

        let file_part = Part::bytes(request.bytes).file_name(request.file_name);
        let form = Form::new().text("message", message).part("file", file_part);

        info!("POST {} (requestId={})", self.api_url, request_id);
        let response = self
            .client
            .post(&self.api_url)
            .header(SECRET_HEADER, &self.secret_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.send_error(e))?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            return Err(ClovaOcrError::ApiError {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let parsed =
            OcrResponse::from_json_slice(&body).map_err(|e| ClovaOcrError::InvalidResponse {
                reason: e.to_string(),
            })?;

        debug!(
            "requestId={}: {} pages, {} fields, {:?}",
            request_id,
            parsed.page_count(),
            parsed.field_count(),
            start.elapsed()
        );
        Ok(parsed)
    }
}
