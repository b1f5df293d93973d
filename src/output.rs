//! Per-project output directory, file writers and saved-result loading.
//!
//! Every run writes into `<output_base>/<project>/`, where `project` is the
//! explicit project name or the source file stem. Files are written to a
//! sibling `.tmp` path and renamed into place so an interrupted run never
//! leaves a half-written output behind.

use crate::error::ClovaOcrError;
use crate::response::OcrResponse;
use crate::transform::{to_rows, ExtractedTable, OcrRow};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const RESULT_JSON_FILE: &str = "ocr_result.json";
pub const TEXT_FILE: &str = "extracted_text.txt";
pub const ROWS_CSV_FILE: &str = "ocr_data.csv";
pub const MARKDOWN_FILE: &str = "document.md";
pub const SEARCHABLE_PDF_FILE: &str = "searchable.pdf";

/// Header of `ocr_data.csv`.
pub const ROW_COLUMNS: [&str; 8] = [
    "page",
    "field_index",
    "text",
    "confidence",
    "type",
    "line_break",
    "x1",
    "y1",
];

/// Project name used when the source path has no usable stem.
const FALLBACK_PROJECT: &str = "document";

/// Resolves and writes the files of one project directory.
#[derive(Debug, Clone)]
pub struct OutputManager {
    project_dir: PathBuf,
}

impl OutputManager {
    /// Project directory for `source`: `project_name`, else the file stem.
    pub fn new(source: &Path, output_base: &Path, project_name: Option<&str>) -> Self {
        let project = match project_name {
            Some(name) => name.to_string(),
            None => source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| FALLBACK_PROJECT.to_string()),
        };
        Self::for_project(output_base, &project)
    }

    pub fn for_project(output_base: &Path, project: &str) -> Self {
        Self {
            project_dir: output_base.join(project),
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Create the project directory and its parents.
    pub async fn setup_directories(&self) -> Result<(), ClovaOcrError> {
        tokio::fs::create_dir_all(&self.project_dir)
            .await
            .map_err(|e| ClovaOcrError::OutputWriteFailed {
                path: self.project_dir.clone(),
                source: e,
            })?;
        debug!("Output directory ready: {}", self.project_dir.display());
        Ok(())
    }

    /// Path of `filename` inside the project directory.
    pub fn get_path(&self, filename: &str) -> PathBuf {
        self.project_dir.join(filename)
    }

    /// `ocr_result.json`: the response body as the service sent it,
    /// pretty-printed.
    pub async fn write_json(&self, response: &OcrResponse) -> Result<PathBuf, ClovaOcrError> {
        let path = self.get_path(RESULT_JSON_FILE);
        let body = response
            .to_raw_json()
            .and_then(|raw| serde_json::to_vec_pretty(&*raw))
            .map_err(|e| ClovaOcrError::Internal(format!("JSON encoding failed: {e}")))?;
        write_atomic(&path, &body).await?;
        Ok(path)
    }

    pub async fn write_text(&self, text: &str) -> Result<PathBuf, ClovaOcrError> {
        let path = self.get_path(TEXT_FILE);
        write_atomic(&path, text.as_bytes()).await?;
        Ok(path)
    }

    pub async fn write_rows(&self, rows: &[OcrRow]) -> Result<PathBuf, ClovaOcrError> {
        let path = self.get_path(ROWS_CSV_FILE);
        let body = rows_to_csv(rows).map_err(|e| ClovaOcrError::Csv {
            path: path.clone(),
            source: e,
        })?;
        write_atomic(&path, &body).await?;
        Ok(path)
    }

    pub async fn write_markdown(&self, markdown: &str) -> Result<PathBuf, ClovaOcrError> {
        let path = self.get_path(MARKDOWN_FILE);
        write_atomic(&path, markdown.as_bytes()).await?;
        Ok(path)
    }

    /// `page{P}_table{T}.csv`: header row, then data rows.
    pub async fn write_table(&self, table: &ExtractedTable) -> Result<PathBuf, ClovaOcrError> {
        let path = self.get_path(&table.file_name());
        let body = table_to_csv(table).map_err(|e| ClovaOcrError::Csv {
            path: path.clone(),
            source: e,
        })?;
        write_atomic(&path, &body).await?;
        Ok(path)
    }
}

/// Encode rows as `ocr_data.csv`. The header is written even without rows.
pub fn rows_to_csv(rows: &[OcrRow]) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.write_record(ROW_COLUMNS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

pub fn table_to_csv(table: &ExtractedTable) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(&table.header)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Decode `ocr_data.csv` contents.
pub fn rows_from_csv(data: &[u8]) -> Result<Vec<OcrRow>, csv::Error> {
    csv::Reader::from_reader(data).deserialize().collect()
}

async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ClovaOcrError> {
    let write_err = |e| ClovaOcrError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, contents).await.map_err(write_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(write_err)?;
    info!("Wrote {}", path.display());
    Ok(())
}

/// A previously persisted run.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedResult {
    pub response: OcrResponse,
    pub rows: Vec<OcrRow>,
}

/// Load `ocr_result.json` and `ocr_data.csv` from `<output_base>/<project>/`.
///
/// Returns `Ok(None)` when the JSON file is absent. A missing CSV is not an
/// error: the rows are rebuilt from the response.
pub async fn load_saved_result(
    project: &str,
    output_base: impl AsRef<Path>,
) -> Result<Option<SavedResult>, ClovaOcrError> {
    let manager = OutputManager::for_project(output_base.as_ref(), project);
    let json_path = manager.get_path(RESULT_JSON_FILE);

    let body = match tokio::fs::read(&json_path).await {
        Ok(body) => body,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("No saved result at {}", json_path.display());
            return Ok(None);
        }
        Err(e) => {
            return Err(ClovaOcrError::ReadFailed {
                path: json_path,
                source: e,
            })
        }
    };
    let response =
        OcrResponse::from_json_slice(&body).map_err(|e| ClovaOcrError::CorruptSavedResult {
            path: json_path.clone(),
            source: e,
        })?;

    let csv_path = manager.get_path(ROWS_CSV_FILE);
    let rows = match tokio::fs::read(&csv_path).await {
        Ok(data) => rows_from_csv(&data).map_err(|e| ClovaOcrError::Csv {
            path: csv_path.clone(),
            source: e,
        })?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} missing; rebuilding rows", csv_path.display());
            to_rows(&response)
        }
        Err(e) => {
            return Err(ClovaOcrError::ReadFailed {
                path: csv_path,
                source: e,
            })
        }
    };

    info!(
        "Loaded saved result for '{}': {} pages, {} rows",
        project,
        response.page_count(),
        rows.len()
    );
    Ok(Some(SavedResult { response, rows }))
}
