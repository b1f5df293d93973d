//! # clova-ocr
//!
//! Client for the NAVER CLOVA OCR (V2) service, plus pure transformers that
//! turn its JSON response into rows, plain text, Markdown, tables and a
//! searchable PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / image
//!  │
//!  ├─ 1. Input      validate the file, derive format and name
//!  ├─ 2. Request    message JSON + file bytes (multipart)
//!  ├─ 3. Service    POST with X-OCR-SECRET, parse the response
//!  ├─ 4. Cache      (path, lang, table flag) → response, per client
//!  ├─ 5. Transform  rows / text / markdown / tables / summary
//!  └─ 6. Output     <output_base>/<project>/ files, optional PDF overlay
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clova_ocr::{process_document, OcrConfig, OutputFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads CLOVA_OCR_API_URL and CLOVA_OCR_SECRET_KEY
//!     let mut config = OcrConfig::from_env()?;
//!     config.output_formats.push(OutputFormat::Markdown);
//!     let output = process_document("scan.pdf", &config).await?;
//!     for w in &output.written {
//!         eprintln!("{}: {}", w.format, w.path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! The transformers need no network access:
//!
//! ```rust
//! use clova_ocr::{to_text, OcrResponse};
//!
//! let json = r#"{"images":[{"fields":[
//!     {"inferText":"A","inferConfidence":0.9,"lineBreak":false},
//!     {"inferText":"B","inferConfidence":0.9,"lineBreak":true}]}]}"#;
//! let response: OcrResponse = serde_json::from_str(json).unwrap();
//! assert_eq!(to_text(&response), "A B\n");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `clova-ocr` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! clova-ocr = { version = "0.1", default-features = false }
//! ```
//!
//! The searchable-PDF output binds pdfium at runtime, from
//! `PDFIUM_LIB_PATH` if set, otherwise from the system library path.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod output;
pub mod overlay;
pub mod pipeline;
pub mod progress;
pub mod response;
pub mod transform;
pub mod workflow;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use cache::{CacheKey, ResponseCache};
pub use client::OcrClient;
pub use config::{OcrConfig, OcrConfigBuilder, OutputFormat};
pub use error::{ClovaOcrError, OverlayError};
pub use output::{load_saved_result, OutputManager, SavedResult};
pub use overlay::to_searchable_pdf;
pub use pipeline::service::{ClovaHttpService, OcrService};
pub use progress::{NoopProgressCallback, ProgressCallback, WorkflowProgressCallback};
pub use response::{OcrField, OcrPage, OcrResponse, OcrTable, TableCell};
pub use transform::{
    count_tables, extract_page_text, extract_tables, filter_by_confidence, has_tables,
    print_summary, summarize, to_markdown, to_rows, to_text, ExtractedTable, OcrRow, OcrSummary,
    TableCounts,
};
pub use workflow::{
    process_batch, process_document, process_document_sync, process_document_with, ProcessOutput,
    WrittenOutput,
};
