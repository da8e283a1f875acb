//! Append-only column cache for materialized rows.

use crate::value::CellValue;

/// Per-column storage of previously read cell values.
///
/// One growable sequence per column, index-aligned: row `i` is
/// `columns[c][i]` for every column `c`. Rows are appended atomically
/// across all columns via [`push_row`](ColumnCache::push_row); there is no
/// per-column append, so all column sequences have equal length whenever
/// the cache is observable from outside.
#[derive(Debug)]
pub(crate) struct ColumnCache {
    columns: Vec<Vec<CellValue>>,
    /// Row count, tracked separately so zero-column results still count rows.
    rows: usize,
}

impl ColumnCache {
    /// Create an empty cache for the given number of columns.
    pub fn new(column_count: usize) -> Self {
        Self {
            columns: vec![Vec::new(); column_count],
            rows: 0,
        }
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of fully cached rows.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Append one complete row.
    ///
    /// `cells` must hold exactly one value per column; a short or long row
    /// would break index alignment across columns.
    pub fn push_row(&mut self, cells: Vec<CellValue>) {
        assert_eq!(
            cells.len(),
            self.columns.len(),
            "row width must match column count"
        );
        for (column, cell) in self.columns.iter_mut().zip(cells) {
            column.push(cell);
        }
        self.rows += 1;
    }

    /// Get a cached cell, or `None` when `row` or `col` is out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        if row >= self.rows {
            return None;
        }
        self.columns.get(col).map(|column| &column[row])
    }
}
