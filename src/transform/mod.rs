//! Result transformers: pure views over an [`OcrResponse`].
//!
//! Every function here takes the response by reference and computes its
//! output fresh; nothing is cached and nothing can fail. Missing optional
//! parts of the response (tables, bounding boxes) contribute nothing rather
//! than raising.
//!
//! | Function | Output |
//! |----------|--------|
//! | [`to_rows`] | one [`OcrRow`] per field, page-major |
//! | [`to_text`] | plain text, pages joined by [`PAGE_SEPARATOR`] |
//! | [`to_markdown`] | one `## Page N` section per page |
//! | [`extract_tables`] | header + data rows per detected table |
//! | [`summarize`] | per-page counts and confidence statistics |
//!
//! [`OcrResponse`]: crate::response::OcrResponse

pub mod markdown;
pub mod query;
pub mod rows;
pub mod summary;
pub mod tables;
pub mod text;

pub use markdown::{to_markdown, LOW_CONFIDENCE_THRESHOLD};
pub use query::{count_tables, extract_page_text, filter_by_confidence, has_tables, TableCounts};
pub use rows::{to_rows, OcrRow};
pub use summary::{print_summary, summarize, LowestConfidence, OcrSummary, PageSummary};
pub use tables::{build_grid, extract_tables, ExtractedTable, MAX_TABLE_CELLS};
pub use text::{to_text, PAGE_SEPARATOR};
