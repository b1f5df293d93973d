//! Request building: the JSON `message` part plus the raw file bytes.
//!
//! The CLOVA OCR V2 endpoint takes a multipart body with two parts:
//!
//! ```text
//! message = {"images":[{"format":"pdf","name":"report"}],
//!            "requestId":"<uuid v4>","version":"V2",
//!            "timestamp":<epoch ms>,"lang":"ko",
//!            "enableTableDetection":false}
//! file    = <raw bytes>
//! ```
//!
//! Building the request is kept apart from sending it so the metadata can be
//! checked without a network round-trip.

use crate::error::ClovaOcrError;
use crate::pipeline::input::{self, InputFile};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Protocol version sent in every request.
pub const API_VERSION: &str = "V2";

/// The JSON metadata part of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMessage {
    pub images: Vec<ImageSpec>,
    pub request_id: String,
    pub version: String,
    pub timestamp: i64,
    pub lang: String,
    pub enable_table_detection: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSpec {
    pub format: String,
    pub name: String,
}

/// A complete request, ready for an [`crate::pipeline::service::OcrService`].
#[derive(Debug, Clone)]
pub struct OcrRequest {
    pub message: RequestMessage,
    /// File name for the multipart `file` part.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl OcrRequest {
    /// Serialise the metadata part.
    pub fn message_json(&self) -> Result<String, ClovaOcrError> {
        serde_json::to_string(&self.message)
            .map_err(|e| ClovaOcrError::Internal(format!("request message: {e}")))
    }
}

/// Build the metadata for one input file with a fresh request id and timestamp.
pub fn build_message(input: &InputFile, lang: &str, enable_table: bool) -> RequestMessage {
    RequestMessage {
        images: vec![ImageSpec {
            format: input.format.clone(),
            name: input.name.clone(),
        }],
        request_id: Uuid::new_v4().to_string(),
        version: API_VERSION.to_string(),
        timestamp: chrono::Utc::now().timestamp_millis(),
        lang: lang.to_string(),
        enable_table_detection: enable_table,
    }
}

/// Validate `path`, read it, and assemble the request.
pub async fn build_request(
    path: &Path,
    lang: &str,
    enable_table: bool,
) -> Result<OcrRequest, ClovaOcrError> {
    let input = input::resolve_input(path)?;
    let bytes = input::read_bytes(&input).await?;
    Ok(OcrRequest {
        message: build_message(&input, lang, enable_table),
        file_name: input.file_name,
        bytes,
    })
}
