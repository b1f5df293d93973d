//! Error types for the clova-ocr library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ClovaOcrError`] — **Fatal**: the call cannot produce its result at all
//!   (input file missing, credentials not configured, API request failed).
//!   Returned as `Err(ClovaOcrError)` from the client, workflow and config
//!   functions.
//!
//! * [`OverlayError`] — **Non-fatal**: the searchable-PDF overlay could not
//!   be produced. Every other output of the same run is still valid, so the
//!   workflow logs it and records `false` in
//!   [`crate::workflow::ProcessOutput::searchable_pdf`] instead of failing.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the clova-ocr library.
#[derive(Debug, Error)]
pub enum ClovaOcrError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file has no extension, so the OCR `format` cannot be derived.
    #[error("Cannot determine the document format of '{path}': the file has no extension")]
    UnsupportedFormat { path: PathBuf },

    /// Reading a local file failed after it was found.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── API errors ────────────────────────────────────────────────────────
    /// The HTTP request could not be sent or its body could not be read.
    #[error("OCR API request failed: {reason}")]
    RequestFailed { reason: String },

    /// The request did not complete within the configured timeout.
    #[error("OCR API request timed out after {secs}s\nIncrease --timeout.")]
    ApiTimeout { secs: u64 },

    /// The API answered with a non-success HTTP status.
    #[error("OCR API returned HTTP {status}: {body}")]
    ApiError { status: u16, body: String },

    /// The API answered 2xx but the body does not match the response schema.
    #[error("OCR API returned an unreadable response: {reason}")]
    InvalidResponse { reason: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV encoding or decoding failed for a rows/table file.
    #[error("CSV error for '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A saved `ocr_result.json` exists but cannot be parsed.
    #[error("Saved result '{path}' is not valid OCR JSON: {source}")]
    CorruptSavedResult {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// A required credential is missing.
    #[error("Environment variable '{var}' is not set.\nExport it or pass the matching command-line flag.")]
    MissingCredential { var: &'static str },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error raised while writing the searchable-PDF overlay.
#[derive(Debug, Clone, Error)]
pub enum OverlayError {
    /// No pdfium library could be bound.
    #[error("PDFium library unavailable: {0}\nSet PDFIUM_LIB_PATH to the directory containing libpdfium.")]
    PdfiumUnavailable(String),

    /// The source PDF could not be opened.
    #[error("Cannot open PDF '{path}': {detail}")]
    OpenFailed { path: PathBuf, detail: String },

    /// Inserting text into a page failed.
    #[error("Page {page}: text overlay failed: {detail}")]
    PageFailed { page: usize, detail: String },

    /// The modified document could not be saved.
    #[error("Cannot save searchable PDF '{path}': {detail}")]
    SaveFailed { path: PathBuf, detail: String },

    /// The blocking overlay task panicked.
    #[error("Overlay task panicked: {0}")]
    TaskPanicked(String),
}
