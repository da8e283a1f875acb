//! Materialization strategies.
//!
//! Two ways of pulling rows out of an attached cursor into the column cache:
//!
//! - [`WindowedFetch`] reads on demand in bounded pages, keeping memory
//!   proportional to the rows actually viewed and advertising a provisional
//!   phantom row while more data may exist.
//! - [`EagerFetch`] drains the cursor to completion up front and releases it
//!   immediately, for callers that must hold the whole result in memory
//!   (e.g. several results from one statement, where keeping multiple
//!   cursors open is undesirable).
//!
//! Both sit behind the closed [`Materializer`] enum so the model, and
//! through it the display layer, is strategy-agnostic.

use crate::cache::ColumnCache;
use crate::error::Error;
use crate::source::{CursorState, RowSource, SourceHandle};
use crate::value::CellValue;
use tracing::{debug, trace};

/// What a fetch changed, for the model to translate into notifications.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FetchReport {
    /// Inclusive range of newly cached row indices, if any were appended.
    pub inserted: Option<(usize, usize)>,
    /// Index the phantom row occupied, when this fetch hit end of data.
    pub phantom_retracted: Option<usize>,
}

/// Read one full row from the current cursor position.
///
/// A cell that fails to read is reported through the hook and stored as
/// `Null`; the rest of the row is still read. The returned row always has
/// exactly `column_count` cells, so the cache append stays atomic across
/// columns even on partial failure.
fn read_row(
    source: &mut dyn RowSource,
    row: usize,
    column_count: usize,
    hook: &mut dyn FnMut(&Error),
) -> Vec<CellValue> {
    let mut cells = Vec::with_capacity(column_count);
    for column in 0..column_count {
        match source.value(column) {
            Ok(value) => cells.push(value),
            Err(e) => {
                hook(&Error::cell_read(row, column, e.to_string()));
                cells.push(CellValue::Null);
            }
        }
    }
    cells
}

/// Windowed/lazy strategy: bounded on-demand read-ahead.
pub(crate) struct WindowedFetch {
    cache: ColumnCache,
    cursor: CursorState,
    /// Rows to read beyond the requested one per demand; 0 = no bound.
    page_size: usize,
}

impl WindowedFetch {
    pub fn new(handle: SourceHandle, column_count: usize, page_size: usize) -> Self {
        Self {
            cache: ColumnCache::new(column_count),
            cursor: CursorState::Active(handle),
            page_size,
        }
    }

    /// Visible row count: cached rows plus the phantom row while the cursor
    /// may still hold more data.
    pub fn row_count(&self) -> usize {
        self.cache.row_count() + usize::from(self.cursor.is_active())
    }

    pub fn cached_row_count(&self) -> usize {
        self.cache.row_count()
    }

    pub fn is_exhausted(&self) -> bool {
        !self.cursor.is_active()
    }

    pub fn handle(&self) -> Option<&SourceHandle> {
        self.cursor.handle()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.cache.get(row, col)
    }

    /// Release the cursor early (cancellation).
    pub fn release(&mut self) {
        self.cursor.exhaust();
    }

    /// Pull rows from the cursor until `row` is cached plus one page of
    /// read-ahead, or until exhaustion.
    ///
    /// Driver failure while advancing is reported through the hook and then
    /// treated as exhaustion: the cursor is released and the rows cached so
    /// far stay readable.
    pub fn fetch_to(&mut self, row: usize, hook: &mut dyn FnMut(&Error)) -> FetchReport {
        let mut report = FetchReport::default();
        let first_new = self.cache.row_count();
        if row < first_new {
            return report;
        }

        // Sized to satisfy the requested row plus a full page beyond it,
        // amortizing repeated small reads.
        let mut remaining = if self.page_size == 0 {
            usize::MAX
        } else {
            row - first_new + self.page_size
        };
        trace!(row, remaining, "fetching past cached boundary");

        while remaining > 0 {
            let Some(handle) = self.cursor.handle().cloned() else {
                break;
            };
            let mut source = handle.borrow_mut();
            match source.advance() {
                Ok(true) => {
                    let cells = read_row(
                        &mut *source,
                        self.cache.row_count(),
                        self.cache.column_count(),
                        hook,
                    );
                    drop(source);
                    self.cache.push_row(cells);
                    remaining -= 1;
                }
                Ok(false) => {
                    drop(source);
                    self.cursor.exhaust();
                    report.phantom_retracted = Some(self.cache.row_count());
                    debug!(rows = self.cache.row_count(), "cursor exhausted");
                    break;
                }
                Err(e) => {
                    hook(&e);
                    drop(source);
                    self.cursor.exhaust();
                    report.phantom_retracted = Some(self.cache.row_count());
                    debug!(
                        rows = self.cache.row_count(),
                        "cursor released after driver error"
                    );
                    break;
                }
            }
        }

        if self.cache.row_count() > first_new {
            report.inserted = Some((first_new, self.cache.row_count() - 1));
        }
        report
    }
}

/// Eager strategy: full materialization at attach time.
pub(crate) struct EagerFetch {
    cache: ColumnCache,
}

impl EagerFetch {
    /// Drain the cursor to completion and release it.
    ///
    /// The cursor is released before this returns, so the true row count is
    /// known immediately and no later read touches the handle.
    pub fn materialize(
        handle: SourceHandle,
        column_count: usize,
        hook: &mut dyn FnMut(&Error),
    ) -> Self {
        let mut cache = ColumnCache::new(column_count);
        let mut cursor = CursorState::Active(handle);

        while let Some(handle) = cursor.handle().cloned() {
            let mut source = handle.borrow_mut();
            match source.advance() {
                Ok(true) => {
                    let cells = read_row(&mut *source, cache.row_count(), column_count, hook);
                    drop(source);
                    cache.push_row(cells);
                }
                Ok(false) => {
                    drop(source);
                    cursor.exhaust();
                }
                Err(e) => {
                    hook(&e);
                    drop(source);
                    cursor.exhaust();
                }
            }
        }

        debug!(rows = cache.row_count(), "eager materialization complete");
        Self { cache }
    }

    /// True, final row count.
    pub fn row_count(&self) -> usize {
        self.cache.row_count()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.cache.get(row, col)
    }
}

/// The closed set of materialization strategies behind one read contract.
pub(crate) enum Materializer {
    Windowed(WindowedFetch),
    Eager(EagerFetch),
}

impl Materializer {
    pub fn row_count(&self) -> usize {
        match self {
            Materializer::Windowed(w) => w.row_count(),
            Materializer::Eager(e) => e.row_count(),
        }
    }

    pub fn cached_row_count(&self) -> usize {
        match self {
            Materializer::Windowed(w) => w.cached_row_count(),
            Materializer::Eager(e) => e.row_count(),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        match self {
            Materializer::Windowed(w) => w.is_exhausted(),
            Materializer::Eager(_) => true,
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        match self {
            Materializer::Windowed(w) => w.cell(row, col),
            Materializer::Eager(e) => e.cell(row, col),
        }
    }

    /// Fetch enough rows to answer a read at `row`. A no-op for the eager
    /// strategy, which has no fetch-triggering path.
    pub fn fetch_to(&mut self, row: usize, hook: &mut dyn FnMut(&Error)) -> FetchReport {
        match self {
            Materializer::Windowed(w) => w.fetch_to(row, hook),
            Materializer::Eager(_) => FetchReport::default(),
        }
    }

    /// The still-active cursor handle, if this strategy holds one.
    pub fn handle(&self) -> Option<&SourceHandle> {
        match self {
            Materializer::Windowed(w) => w.handle(),
            Materializer::Eager(_) => None,
        }
    }

    /// Release any still-active cursor (cancellation path).
    pub fn release(&mut self) {
        if let Materializer::Windowed(w) = self {
            w.release();
        }
    }
}
