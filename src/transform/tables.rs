//! Table reconstruction from sparse cells.
//!
//! The service reports each table as a list of cells with zero-based
//! `rowIndex`/`columnIndex`. The grid is `(max row + 1) × (max column + 1)`,
//! every position defaults to `""`, and each cell contributes the text of
//! its first line. Row 0 is taken as the header: the service gives no other
//! signal to tell header rows from data rows.
//!
//! Grids larger than [`MAX_TABLE_CELLS`] are not built; such a table is
//! skipped the same way as a table without cells.

use crate::response::{OcrResponse, TableCell};
use serde::Serialize;
use tracing::warn;

/// Largest dense grid (rows × columns) that will be materialised.
pub const MAX_TABLE_CELLS: usize = 1_000_000;

/// One reconstructed table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedTable {
    /// 1-based page number.
    pub page: usize,
    /// 1-based index of the table within its page.
    pub table_index: usize,
    /// Grid row 0.
    pub header: Vec<String>,
    /// Grid rows 1.., each as wide as the header.
    pub rows: Vec<Vec<String>>,
}

impl ExtractedTable {
    /// `page{P}_table{T}.csv`
    pub fn file_name(&self) -> String {
        format!("page{}_table{}.csv", self.page, self.table_index)
    }

    /// `(rows, columns)` of the full grid, header included.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows.len() + 1, self.header.len())
    }

    /// The full grid, header first.
    pub fn grid(&self) -> Vec<Vec<String>> {
        std::iter::once(self.header.clone())
            .chain(self.rows.iter().cloned())
            .collect()
    }
}

/// Dense grid for a set of cells.
///
/// Empty input gives an empty grid, and so does a grid that would exceed
/// [`MAX_TABLE_CELLS`].
pub fn build_grid(cells: &[TableCell]) -> Vec<Vec<String>> {
    let Some(max_row) = cells.iter().map(|c| c.row_index).max() else {
        return Vec::new();
    };
    let max_col = cells.iter().map(|c| c.column_index).max().unwrap_or(0);

    let size = max_row.checked_add(1).zip(max_col.checked_add(1));
    let Some((rows, cols)) = size.filter(|&(r, c)| {
        r.checked_mul(c).is_some_and(|n| n <= MAX_TABLE_CELLS)
    }) else {
        warn!(
            "Table grid of {} x {} cells exceeds {} cells; skipped",
            max_row.saturating_add(1),
            max_col.saturating_add(1),
            MAX_TABLE_CELLS
        );
        return Vec::new();
    };

    let mut grid = vec![vec![String::new(); cols]; rows];
    for cell in cells {
        grid[cell.row_index][cell.column_index] = cell.first_line().to_string();
    }
    grid
}

/// Reconstruct every non-empty table of every page.
///
/// Tables without cells produce nothing but keep their position, so the
/// `table_index` of later tables on the page is unchanged.
pub fn extract_tables(response: &OcrResponse) -> Vec<ExtractedTable> {
    let mut out = Vec::new();
    for (page_idx, page) in response.images.iter().enumerate() {
        for (table_idx, table) in page.tables.iter().enumerate() {
            let mut grid = build_grid(&table.cells).into_iter();
            let Some(header) = grid.next() else {
                continue;
            };
            out.push(ExtractedTable {
                page: page_idx + 1,
                table_index: table_idx + 1,
                header,
                rows: grid.collect(),
            });
        }
    }
    out
}
