//! Human-readable run summary.

use crate::response::OcrResponse;
use serde::Serialize;
use std::fmt;

/// Longest text preview shown for the lowest-confidence field, in characters.
const PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcrSummary {
    pub page_count: usize,
    pub pages: Vec<PageSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSummary {
    /// 1-based page number.
    pub page: usize,
    pub field_count: usize,
    /// None for a page without fields.
    pub mean_confidence: Option<f64>,
    /// None for a page without fields.
    pub lowest: Option<LowestConfidence>,
}

/// The first field holding the page's minimum confidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowestConfidence {
    pub confidence: f64,
    /// At most 50 characters of the field text.
    pub preview: String,
    /// Whether `preview` was cut short.
    pub truncated: bool,
}

/// Compute page count, per-page field counts and confidence statistics.
pub fn summarize(response: &OcrResponse) -> OcrSummary {
    let pages = response
        .images
        .iter()
        .enumerate()
        .map(|(idx, page)| {
            let field_count = page.fields.len();
            let mean_confidence = (field_count > 0).then(|| {
                page.fields.iter().map(|f| f.infer_confidence).sum::<f64>() / field_count as f64
            });

            let lowest = page
                .fields
                .iter()
                .reduce(|min, f| {
                    if f.infer_confidence < min.infer_confidence {
                        f
                    } else {
                        min
                    }
                })
                .map(|f| {
                    let char_count = f.infer_text.chars().count();
                    LowestConfidence {
                        confidence: f.infer_confidence,
                        preview: f.infer_text.chars().take(PREVIEW_CHARS).collect(),
                        truncated: char_count > PREVIEW_CHARS,
                    }
                });

            PageSummary {
                page: idx + 1,
                field_count,
                mean_confidence,
                lowest,
            }
        })
        .collect();

    OcrSummary {
        page_count: response.page_count(),
        pages,
    }
}

/// Write the summary report to stdout.
pub fn print_summary(response: &OcrResponse) {
    println!("{}", summarize(response));
}

impl fmt::Display for OcrSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(50);
        writeln!(f, "{rule}")?;
        writeln!(f, "OCR result summary")?;
        writeln!(f, "{rule}")?;
        write!(f, "Total pages: {}", self.page_count)?;

        for page in &self.pages {
            write!(f, "\n\nPage {}:", page.page)?;
            write!(f, "\n  - fields extracted: {}", page.field_count)?;
            if let Some(mean) = page.mean_confidence {
                write!(f, "\n  - mean confidence: {:.2}%", mean * 100.0)?;
            }
            if let Some(ref low) = page.lowest {
                write!(f, "\n  - lowest confidence: {:.2}%", low.confidence * 100.0)?;
                let ellipsis = if low.truncated { "..." } else { "" };
                write!(f, "\n    text: '{}{}'", low.preview, ellipsis)?;
            }
        }
        Ok(())
    }
}
