//! Progress-callback trait for workflow events.
//!
//! Inject an [`Arc<dyn WorkflowProgressCallback>`] via
//! [`crate::config::OcrConfigBuilder::progress_callback`] to be told when a
//! file starts, when each output file lands on disk, and when a file
//! finishes or fails. The CLI uses it to drive its progress bar; library
//! callers can forward events anywhere without the workflow knowing how.
//!
//! # Example
//!
//! ```rust
//! use clova_ocr::{OutputFormat, WorkflowProgressCallback};
//! use std::path::Path;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct CountingCallback {
//!     written: AtomicUsize,
//! }
//!
//! impl WorkflowProgressCallback for CountingCallback {
//!     fn on_output_written(&self, _format: OutputFormat, path: &Path) {
//!         self.written.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("wrote {}", path.display());
//!     }
//! }
//! ```

use crate::config::OutputFormat;
use std::path::Path;
use std::sync::Arc;

/// Called by the workflow as it processes files.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Batches run sequentially, so events for one file
/// never interleave with another's.
pub trait WorkflowProgressCallback: Send + Sync {
    /// Called once before the first file of a batch.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called before the OCR request for a file.
    ///
    /// `file_num` is 1-indexed within the batch (always 1 for a single file).
    fn on_file_start(&self, file_num: usize, total_files: usize, path: &Path) {
        let _ = (file_num, total_files, path);
    }

    /// Called after an output file has been written.
    fn on_output_written(&self, format: OutputFormat, path: &Path) {
        let _ = (format, path);
    }

    /// Called when every requested output of a file has been produced.
    fn on_file_complete(&self, file_num: usize, total_files: usize, field_count: usize) {
        let _ = (file_num, total_files, field_count);
    }

    /// Called when a file fails.
    fn on_file_error(&self, file_num: usize, total_files: usize, error: &str) {
        let _ = (file_num, total_files, error);
    }

    /// Called once after every file of a batch has been attempted.
    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let _ = (total_files, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl WorkflowProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::OcrConfig`].
pub type ProgressCallback = Arc<dyn WorkflowProgressCallback>;
