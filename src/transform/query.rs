//! Small queries over rows and responses.

use crate::response::OcrResponse;
use crate::transform::rows::OcrRow;
use crate::transform::text::page_text;
use serde::Serialize;

/// Rows with `confidence >= min_confidence`, in their original order.
///
/// Returns `None` when there are no rows to filter at all, so "nothing to
/// filter" stays distinguishable from "nothing passed".
pub fn filter_by_confidence(rows: &[OcrRow], min_confidence: f64) -> Option<Vec<OcrRow>> {
    if rows.is_empty() {
        return None;
    }
    Some(
        rows.iter()
            .filter(|r| r.confidence >= min_confidence)
            .cloned()
            .collect(),
    )
}

/// Text of a single 1-based page, joined like [`crate::transform::to_text`].
///
/// An out-of-range page number yields a descriptive placeholder instead of
/// an error.
pub fn extract_page_text(response: &OcrResponse, page_num: usize) -> String {
    match response.page(page_num) {
        Some(page) => page_text(page),
        None => format!("Page {page_num} does not exist."),
    }
}

/// Whether any page reports at least one table.
pub fn has_tables(response: &OcrResponse) -> bool {
    response.images.iter().any(|p| !p.tables.is_empty())
}

/// Table counts per page and overall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    /// `per_page[i]` is the count for page `i + 1`.
    pub per_page: Vec<usize>,
    pub total: usize,
}

impl TableCounts {
    /// Count for a 1-based page; 0 when out of range.
    pub fn page(&self, page_num: usize) -> usize {
        page_num
            .checked_sub(1)
            .and_then(|i| self.per_page.get(i).copied())
            .unwrap_or(0)
    }
}

pub fn count_tables(response: &OcrResponse) -> TableCounts {
    let per_page: Vec<usize> = response.images.iter().map(|p| p.tables.len()).collect();
    let total = per_page.iter().sum();
    TableCounts { per_page, total }
}
