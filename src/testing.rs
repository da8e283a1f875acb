//! Test support: an in-memory row source with injectable failures.
//!
//! `VecSource` replays a fixed set of rows through the [`RowSource`]
//! contract and can be told to fail specific metadata reads, cell reads, or
//! a specific `advance` call, so both this crate's tests and driver-glue
//! tests can exercise the recovery paths without a live database.

use crate::column::ColumnMeta;
use crate::error::{Error, Result};
use crate::source::{RowSource, SourceHandle};
use crate::value::CellValue;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

/// In-memory forward-only row source.
pub struct VecSource {
    columns: Vec<ColumnMeta>,
    rows: Vec<Vec<CellValue>>,
    /// Index of the next row `advance` will move to.
    next: usize,
    /// Row made current by the last successful `advance`.
    current: Option<usize>,
    releases: Rc<Cell<usize>>,
    fail_whole_metadata: bool,
    fail_meta: HashSet<usize>,
    fail_cells: HashSet<(usize, usize)>,
    fail_advance_at: Option<usize>,
}

impl VecSource {
    /// Create a source over fixed columns and rows.
    ///
    /// Every row must have one value per column.
    pub fn new(columns: Vec<ColumnMeta>, rows: Vec<Vec<CellValue>>) -> Self {
        for row in &rows {
            assert_eq!(row.len(), columns.len(), "row width must match columns");
        }
        Self {
            columns,
            rows,
            next: 0,
            current: None,
            releases: Rc::new(Cell::new(0)),
            fail_whole_metadata: false,
            fail_meta: HashSet::new(),
            fail_cells: HashSet::new(),
            fail_advance_at: None,
        }
    }

    /// Make `column_count` fail, so attaching this source fails as a whole.
    pub fn with_metadata_failure(mut self) -> Self {
        self.fail_whole_metadata = true;
        self
    }

    /// Make metadata for one column fail (the column-level fallback path).
    pub fn with_column_meta_failure(mut self, column: usize) -> Self {
        self.fail_meta.insert(column);
        self
    }

    /// Make one cell read fail (stored as NULL by the engine).
    pub fn with_cell_failure(mut self, row: usize, column: usize) -> Self {
        self.fail_cells.insert((row, column));
        self
    }

    /// Make `advance` fail when it would move to the given row index.
    pub fn with_advance_failure(mut self, row: usize) -> Self {
        self.fail_advance_at = Some(row);
        self
    }

    /// Shared counter of `release` calls, for asserting single release.
    pub fn release_count(&self) -> Rc<Cell<usize>> {
        self.releases.clone()
    }

    /// Wrap into the handle type the model attaches.
    pub fn into_handle(self) -> SourceHandle {
        Rc::new(RefCell::new(self))
    }
}

impl RowSource for VecSource {
    fn column_count(&self) -> Result<usize> {
        if self.fail_whole_metadata {
            return Err(Error::cursor("simulated metadata failure"));
        }
        Ok(self.columns.len())
    }

    fn column_meta(&self, index: usize) -> Result<ColumnMeta> {
        if self.fail_meta.contains(&index) {
            return Err(Error::metadata(index, "simulated metadata failure"));
        }
        self.columns
            .get(index)
            .cloned()
            .ok_or(Error::ColumnIndexOutOfBounds {
                index,
                count: self.columns.len(),
            })
    }

    fn advance(&mut self) -> Result<bool> {
        if self.fail_advance_at == Some(self.next) {
            // Fail once, then behave as exhausted.
            self.fail_advance_at = None;
            self.current = None;
            return Err(Error::cursor("simulated driver failure"));
        }
        if self.next < self.rows.len() {
            self.current = Some(self.next);
            self.next += 1;
            Ok(true)
        } else {
            self.current = None;
            Ok(false)
        }
    }

    fn value(&mut self, column: usize) -> Result<CellValue> {
        let row = self
            .current
            .ok_or_else(|| Error::cursor("value read with no current row"))?;
        if self.fail_cells.contains(&(row, column)) {
            return Err(Error::cell_read(row, column, "simulated conversion failure"));
        }
        self.rows[row]
            .get(column)
            .cloned()
            .ok_or(Error::ColumnIndexOutOfBounds {
                index: column,
                count: self.columns.len(),
            })
    }

    fn release(&mut self) {
        self.releases.set(self.releases.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_source() -> VecSource {
        VecSource::new(
            vec![ColumnMeta::new("A", 1)],
            vec![vec![CellValue::Integer(1)], vec![CellValue::Integer(2)]],
        )
    }

    #[test]
    fn test_replays_rows_in_order() {
        let mut source = make_test_source();
        assert!(source.advance().unwrap());
        assert_eq!(source.value(0).unwrap(), CellValue::Integer(1));
        assert!(source.advance().unwrap());
        assert_eq!(source.value(0).unwrap(), CellValue::Integer(2));
        assert!(!source.advance().unwrap());
    }

    #[test]
    fn test_value_without_current_row_fails() {
        let mut source = make_test_source();
        assert!(source.value(0).is_err());
    }

    #[test]
    fn test_advance_failure_fires_once() {
        let mut source = make_test_source().with_advance_failure(0);
        assert!(source.advance().is_err());
        // The injected failure is one-shot; the engine releases the cursor
        // after it anyway.
        assert!(source.advance().unwrap());
    }
}
