//! End-to-end document processing.
//!
//! One file goes through: project directory setup, the cache-checked OCR
//! call, the summary printout, then one write per configured output format.
//! A searchable-PDF overlay failure is recorded in
//! [`ProcessOutput::searchable_pdf`] and does not fail the file; any other
//! write failure does.
//!
//! Batches run files one after another through the same client, so repeated
//! inputs hit the cache, and a failed file does not stop the ones after it.

use crate::client::OcrClient;
use crate::config::{OcrConfig, OutputFormat};
use crate::error::ClovaOcrError;
use crate::output::{OutputManager, SEARCHABLE_PDF_FILE};
use crate::overlay;
use crate::response::OcrResponse;
use crate::transform::{self, OcrRow};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// A file produced by the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenOutput {
    pub format: OutputFormat,
    pub path: PathBuf,
}

/// Everything one processed file yielded.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub response: Arc<OcrResponse>,
    pub rows: Vec<OcrRow>,
    pub project_dir: PathBuf,
    /// Files written, in write order.
    pub written: Vec<WrittenOutput>,
    /// Overlay outcome; `None` when the format was not requested.
    pub searchable_pdf: Option<bool>,
}

impl ProcessOutput {
    /// Paths written for `format`.
    pub fn paths_for(&self, format: OutputFormat) -> impl Iterator<Item = &Path> {
        self.written
            .iter()
            .filter(move |w| w.format == format)
            .map(|w| w.path.as_path())
    }
}

/// Process one file with a fresh client.
///
/// # Example
/// ```rust,no_run
/// use clova_ocr::{process_document, OcrConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = OcrConfig::from_env()?;
/// let out = process_document("receipt.jpg", &config).await?;
/// println!("{} fields -> {}", out.rows.len(), out.project_dir.display());
/// # Ok(())
/// # }
/// ```
pub async fn process_document(
    input: impl AsRef<Path>,
    config: &OcrConfig,
) -> Result<ProcessOutput, ClovaOcrError> {
    let mut client = OcrClient::new(config)?;
    process_document_with(&mut client, input, config).await
}

/// Process one file through an existing client, reusing its cache.
pub async fn process_document_with(
    client: &mut OcrClient,
    input: impl AsRef<Path>,
    config: &OcrConfig,
) -> Result<ProcessOutput, ClovaOcrError> {
    let input = input.as_ref();
    let cb = config.progress_callback.as_ref();
    if let Some(cb) = cb {
        cb.on_file_start(1, 1, input);
    }

    let result = run(client, input, config).await;
    if let Some(cb) = cb {
        match &result {
            Ok(out) => cb.on_file_complete(1, 1, out.rows.len()),
            Err(e) => cb.on_file_error(1, 1, &e.to_string()),
        }
    }
    result
}

/// Synchronous wrapper around [`process_document`].
///
/// Creates a temporary tokio runtime internally.
pub fn process_document_sync(
    input: impl AsRef<Path>,
    config: &OcrConfig,
) -> Result<ProcessOutput, ClovaOcrError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ClovaOcrError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(process_document(input, config))
}

/// Process several files in order, collecting one result per input.
///
/// `config.project_name` is ignored here: each file gets the directory named
/// after its own stem.
pub async fn process_batch(
    client: &mut OcrClient,
    inputs: &[PathBuf],
    config: &OcrConfig,
) -> Vec<(PathBuf, Result<ProcessOutput, ClovaOcrError>)> {
    let total = inputs.len();
    let cb = config.progress_callback.as_ref();
    if let Some(cb) = cb {
        cb.on_batch_start(total);
    }

    let per_file = OcrConfig {
        project_name: None,
        ..config.clone()
    };

    let mut results = Vec::with_capacity(total);
    let mut success = 0usize;
    for (i, input) in inputs.iter().enumerate() {
        let file_num = i + 1;
        if let Some(cb) = cb {
            cb.on_file_start(file_num, total, input);
        }

        let result = run(client, input, &per_file).await;
        match &result {
            Ok(out) => {
                success += 1;
                if let Some(cb) = cb {
                    cb.on_file_complete(file_num, total, out.rows.len());
                }
            }
            Err(e) => {
                warn!("[{}/{}] {} failed: {}", file_num, total, input.display(), e);
                if let Some(cb) = cb {
                    cb.on_file_error(file_num, total, &e.to_string());
                }
            }
        }
        results.push((input.clone(), result));
    }

    info!("Batch complete: {}/{} files succeeded", success, total);
    if let Some(cb) = cb {
        cb.on_batch_complete(total, success);
    }
    results
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn run(
    client: &mut OcrClient,
    input: &Path,
    config: &OcrConfig,
) -> Result<ProcessOutput, ClovaOcrError> {
    let start = Instant::now();
    info!("Processing {}", input.display());

    // ── Step 1: Project directory ────────────────────────────────────────
    let manager = OutputManager::new(input, &config.output_base, config.project_name.as_deref());
    manager.setup_directories().await?;

    // ── Step 2: OCR (cache-checked) ──────────────────────────────────────
    let response = client
        .ocr_from_file(input, &config.lang, config.enable_table)
        .await?;

    // ── Step 3: Summary ──────────────────────────────────────────────────
    if config.print_summary {
        transform::print_summary(&response);
    }

    // ── Step 4: Outputs ──────────────────────────────────────────────────
    let rows = transform::to_rows(&response);
    let mut written = Vec::new();
    let mut searchable_pdf = None;

    for &format in &config.output_formats {
        let paths = match format {
            OutputFormat::Json => vec![manager.write_json(&response).await?],
            OutputFormat::Text => vec![manager.write_text(&transform::to_text(&response)).await?],
            OutputFormat::Csv => vec![manager.write_rows(&rows).await?],
            OutputFormat::Markdown => {
                let md = transform::to_markdown(&response, config.include_confidence);
                vec![manager.write_markdown(&md).await?]
            }
            OutputFormat::SearchablePdf => {
                let out = manager.get_path(SEARCHABLE_PDF_FILE);
                let ok = overlay::to_searchable_pdf(input, Arc::clone(&response), &out).await;
                searchable_pdf = Some(ok);
                if ok {
                    vec![out]
                } else {
                    Vec::new()
                }
            }
            OutputFormat::Tables => {
                if !config.enable_table {
                    debug!("Table output requested without table detection; skipped");
                    continue;
                }
                let mut paths = Vec::new();
                for table in transform::extract_tables(&response) {
                    paths.push(manager.write_table(&table).await?);
                }
                paths
            }
        };

        for path in paths {
            if let Some(ref cb) = config.progress_callback {
                cb.on_output_written(format, &path);
            }
            written.push(WrittenOutput { format, path });
        }
    }

    if searchable_pdf == Some(false) {
        error!("Searchable PDF for {} was not produced", input.display());
    }
    info!(
        "Processed {} in {}ms: {} outputs in {}",
        input.display(),
        start.elapsed().as_millis(),
        written.len(),
        manager.project_dir().display()
    );

    Ok(ProcessOutput {
        response,
        rows,
        project_dir: manager.project_dir().to_path_buf(),
        written,
        searchable_pdf,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::request::OcrRequest;
    use crate::pipeline::service::OcrService;
    use crate::transform::fixtures::{field, response};
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct FixedService(OcrResponse);

    #[async_trait]
    impl OcrService for FixedService {
        async fn recognize(&self, _request: OcrRequest) -> Result<OcrResponse, ClovaOcrError> {
            Ok(self.0.clone())
        }
    }

    fn config(dir: &Path, formats: Vec<OutputFormat>) -> OcrConfig {
        let resp = response(vec![vec![field("A", 0.9, false), field("B", 0.8, true)]]);
        OcrConfig::builder()
            .service(Arc::new(FixedService(resp)))
            .output_base(dir.join("out"))
            .output_formats(formats)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn default_formats_are_written() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("scan.png");
        std::fs::write(&input, b"png").unwrap();

        let out = process_document(&input, &config(dir.path(), OutputFormat::defaults()))
            .await
            .unwrap();

        assert_eq!(out.project_dir, dir.path().join("out").join("scan"));
        let formats: Vec<_> = out.written.iter().map(|w| w.format).collect();
        assert_eq!(formats, OutputFormat::defaults());
        assert!(out.written.iter().all(|w| w.path.is_file()));
        assert_eq!(out.rows.len(), 2);
        assert!(out.searchable_pdf.is_none());
    }

    #[tokio::test]
    async fn tables_need_detection_enabled() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("scan.png");
        std::fs::write(&input, b"png").unwrap();

        let out = process_document(&input, &config(dir.path(), vec![OutputFormat::Tables]))
            .await
            .unwrap();
        assert!(out.written.is_empty());
    }

    #[tokio::test]
    async fn missing_input_fails_before_outputs() {
        let dir = TempDir::new().unwrap();
        let err = process_document(dir.path().join("absent.pdf"), &config(dir.path(), vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, ClovaOcrError::FileNotFound { .. }));
    }
}
