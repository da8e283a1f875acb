//! Row source trait and cursor lifecycle state.
//!
//! A `RowSource` is the forward-only, single-pass cursor the engine
//! materializes from: driver glue implements it on top of whatever statement
//! execution machinery the application uses. The engine never scrolls
//! backward and never reads a value before `advance` has reported a current
//! row.

use crate::column::ColumnMeta;
use crate::error::Result;
use crate::value::CellValue;
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to an attached row source.
///
/// `Rc<RefCell<..>>` keeps the whole engine on one logical thread, which is
/// the concurrency contract: the cursor is not safe for concurrent
/// advancement, and all fetch-triggering reads happen on the thread that
/// owns the model. Handle identity (`Rc::ptr_eq`) is what makes redundant
/// attach calls detectable.
pub type SourceHandle = Rc<RefCell<dyn RowSource>>;

/// A forward-only, single-pass source of rows with column metadata.
///
/// # Lifecycle
///
/// 1. Created by driver glue, typically on a worker thread.
/// 2. Attached to a [`GridModel`](crate::GridModel), which captures column
///    metadata once.
/// 3. Advanced row by row as the model fetches on demand.
/// 4. Released exactly once, either on exhaustion or on early detach.
pub trait RowSource {
    /// Number of columns in the result.
    ///
    /// An error here means the cursor's metadata is unreadable as a whole
    /// and the attach fails.
    fn column_count(&self) -> Result<usize>;

    /// Metadata for one column.
    ///
    /// An error here is recovered per column with a synthesized descriptor;
    /// it does not fail the attach.
    fn column_meta(&self, index: usize) -> Result<ColumnMeta>;

    /// Advance to the next row.
    ///
    /// Returns `Ok(true)` when a row is available and now current,
    /// `Ok(false)` on end of data.
    fn advance(&mut self) -> Result<bool>;

    /// Read one value from the current row.
    ///
    /// Absent values are reported as `CellValue::Null`. Must only be called
    /// after `advance` returned `Ok(true)`.
    fn value(&mut self, column: usize) -> Result<CellValue>;

    /// Close the cursor and release driver resources.
    ///
    /// Called exactly once by the engine; must not be called again.
    fn release(&mut self);
}

/// Lifecycle state of an attached cursor.
///
/// `Active` owns the only engine-side handle to the cursor. The transition
/// to `Exhausted` moves the handle out, calls `release()` on it, and drops
/// it, so nothing in the engine can touch the cursor afterward. There is no
/// way back from `Exhausted` short of a full reset.
pub(crate) enum CursorState {
    /// No cursor attached.
    Unattached,
    /// Cursor attached and not yet drained.
    Active(SourceHandle),
    /// Cursor drained (or cancelled) and released.
    Exhausted,
}

impl CursorState {
    /// Whether more rows may still be pulled from the cursor.
    pub fn is_active(&self) -> bool {
        matches!(self, CursorState::Active(_))
    }

    /// Borrow the active handle, if any.
    pub fn handle(&self) -> Option<&SourceHandle> {
        match self {
            CursorState::Active(handle) => Some(handle),
            _ => None,
        }
    }

    /// Transition to `Exhausted`, releasing the cursor if one is active.
    ///
    /// The single release point: the handle is moved out and dropped here,
    /// so `release()` runs at most once per attached cursor.
    pub fn exhaust(&mut self) {
        if let CursorState::Active(handle) = std::mem::replace(self, CursorState::Exhausted) {
            handle.borrow_mut().release();
        }
    }
}
