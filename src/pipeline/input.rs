//! Input resolution: validate a local file and read its upload bytes.
//!
//! Everything here runs before any network activity, so a missing or
//! unreadable file is reported without a request ever being sent. The file
//! is read into memory in one scoped call; the handle is closed before the
//! upload starts regardless of what happens to the request.

use crate::error::ClovaOcrError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A validated input file, ready to be uploaded.
#[derive(Debug, Clone)]
pub struct InputFile {
    /// Path as given by the caller.
    pub path: PathBuf,
    /// OCR `format` value: lower-case extension, `jpeg` normalised to `jpg`.
    pub format: String,
    /// OCR `name` value: the file stem.
    pub name: String,
    /// File name sent with the multipart file part.
    pub file_name: String,
}

/// Validate `path` and derive its OCR format and name.
pub fn resolve_input(path: &Path) -> Result<InputFile, ClovaOcrError> {
    if !path.is_file() {
        return Err(ClovaOcrError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let format = document_format(path).ok_or_else(|| ClovaOcrError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{name}.{format}"));

    debug!("Resolved input {} (format={})", path.display(), format);
    Ok(InputFile {
        path: path.to_path_buf(),
        format,
        name,
        file_name,
    })
}

/// Read the whole file. The handle does not outlive this call.
pub async fn read_bytes(input: &InputFile) -> Result<Vec<u8>, ClovaOcrError> {
    tokio::fs::read(&input.path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => ClovaOcrError::PermissionDenied {
            path: input.path.clone(),
        },
        _ => ClovaOcrError::ReadFailed {
            path: input.path.clone(),
            source: e,
        },
    })
}

/// OCR `format` for a path: lower-case extension, `jpeg` → `jpg`.
pub fn document_format(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    if ext.is_empty() {
        return None;
    }
    Some(if ext == "jpeg" { "jpg".to_string() } else { ext })
}
