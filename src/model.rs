//! The tabular view adapter.
//!
//! `GridModel` is the public face of the engine: the display layer attaches
//! a cursor, then reads metadata and cell values through a random-access
//! contract while the active materialization strategy pulls rows from the
//! cursor behind the scenes.
//!
//! # Threading
//!
//! One logical consumer thread per model. Constructing the row source may
//! happen on a worker thread, but every call on the model after `attach`
//! must come from the single thread that owns it; the `Rc`-based handle
//! type enforces that the model never crosses threads.

use crate::column::{ColumnDescriptor, GENERIC_TEXT_TYPE};
use crate::config::GridConfig;
use crate::error::{Error, Result};
use crate::fetch::{EagerFetch, FetchReport, Materializer, WindowedFetch};
use crate::source::{RowSource, SourceHandle};
use crate::value::CellValue;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::warn;

/// Change notification delivered to model subscribers.
///
/// `RowsRemoved` on the index one past the cached rows is the phantom-row
/// retraction: the display layer should treat it as "stop expecting more
/// rows", not as a user-visible deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridEvent {
    /// Column set replaced (attach or detach).
    StructureChanged,
    /// All cached data discarded (attach or detach).
    DataReset,
    /// Rows `first..=last` became available.
    RowsInserted { first: usize, last: usize },
    /// Rows `first..=last` were retracted.
    RowsRemoved { first: usize, last: usize },
}

/// Random-access tabular adapter over a forward-only cursor.
pub struct GridModel {
    columns: Vec<ColumnDescriptor>,
    materializer: Option<Materializer>,
    /// Identity of the attached cursor, kept weak so exhaustion can drop
    /// the handle while redundant attach calls stay detectable.
    attached: Option<Weak<RefCell<dyn RowSource>>>,
    page_size: Option<usize>,
    null_placeholder: String,
    subscribers: Vec<Box<dyn FnMut(&GridEvent)>>,
    error_hook: Box<dyn FnMut(&Error)>,
}

impl Default for GridModel {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

impl GridModel {
    /// Create an unattached model.
    ///
    /// `config.page_size` selects the materialization strategy for every
    /// later attach: `Some(n)` windowed with page size `n`, `None` eager.
    pub fn new(config: GridConfig) -> Self {
        Self {
            columns: Vec::new(),
            materializer: None,
            attached: None,
            page_size: config.page_size,
            null_placeholder: config.null_placeholder,
            subscribers: Vec::new(),
            error_hook: Box::new(|e| warn!(error = %e, "recovered fetch error")),
        }
    }

    /// Register a change-notification subscriber.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&GridEvent) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Replace the hook invoked on recovered fetch-time failures.
    ///
    /// The default hook logs through `tracing`.
    pub fn set_error_hook(&mut self, hook: impl FnMut(&Error) + 'static) {
        self.error_hook = Box::new(hook);
    }

    /// Attach a cursor, capturing its column metadata once.
    ///
    /// Attaching the cursor instance that is already attached is a no-op:
    /// no re-materialization, no notifications. Attaching a different
    /// cursor releases the previous one first.
    ///
    /// Fails with [`Error::Attach`] when the cursor's metadata is
    /// unreadable as a whole, leaving the model unattached. A single
    /// column's unreadable metadata is not fatal; that column gets a
    /// synthesized name and a generic text type, and the failure is
    /// reported through the error hook.
    ///
    /// On success, emits `StructureChanged` followed by `DataReset`.
    pub fn attach(&mut self, source: SourceHandle) -> Result<()> {
        if self.is_attached_to(&source) {
            return Ok(());
        }

        if let Some(mut previous) = self.materializer.take() {
            previous.release();
        }
        self.columns.clear();
        self.attached = None;

        let columns = self.capture_columns(&source)?;
        let column_count = columns.len();
        let materializer = match self.page_size {
            Some(page_size) => Materializer::Windowed(WindowedFetch::new(
                source.clone(),
                column_count,
                page_size,
            )),
            None => Materializer::Eager(EagerFetch::materialize(
                source.clone(),
                column_count,
                &mut self.error_hook,
            )),
        };

        self.attached = Some(Rc::downgrade(&source));
        self.columns = columns;
        self.materializer = Some(materializer);
        self.emit(GridEvent::StructureChanged);
        self.emit(GridEvent::DataReset);
        Ok(())
    }

    /// Detach and release any attached cursor, discarding cached data.
    ///
    /// Safe to call while the cursor is still active (cancellation): the
    /// cursor is released immediately. No-op on an unattached model.
    pub fn detach(&mut self) {
        if self.materializer.is_none() && self.columns.is_empty() {
            return;
        }
        if let Some(mut previous) = self.materializer.take() {
            previous.release();
        }
        self.columns.clear();
        self.attached = None;
        self.emit(GridEvent::StructureChanged);
        self.emit(GridEvent::DataReset);
    }

    /// Whether a cursor is attached.
    pub fn is_attached(&self) -> bool {
        self.materializer.is_some()
    }

    /// Captured column descriptors, empty when unattached.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column name, or the synthesized fallback when unattached or out of
    /// range.
    pub fn column_name(&self, index: usize) -> String {
        match self.columns.get(index) {
            Some(column) => column.name.clone(),
            None => ColumnDescriptor::fallback_name(index),
        }
    }

    /// Driver type code, or the generic text type when unattached or out
    /// of range.
    pub fn column_type(&self, index: usize) -> i32 {
        self.columns
            .get(index)
            .map_or(GENERIC_TEXT_TYPE, |column| column.type_code)
    }

    /// All column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Visible row count.
    ///
    /// For the windowed strategy this is the cached rows plus one phantom
    /// row while more data may exist, settling to the true count on
    /// exhaustion; answering it never triggers a fetch. The eager strategy
    /// reports the true count from the start. Zero when unattached.
    pub fn row_count(&self) -> usize {
        self.materializer.as_ref().map_or(0, Materializer::row_count)
    }

    /// Rows actually cached so far.
    pub fn cached_row_count(&self) -> usize {
        self.materializer
            .as_ref()
            .map_or(0, Materializer::cached_row_count)
    }

    /// Whether the cursor has been drained and released, so no more rows
    /// can appear.
    pub fn is_exhausted(&self) -> bool {
        self.materializer
            .as_ref()
            .map_or(true, Materializer::is_exhausted)
    }

    /// Read the value at `row`, `col`, fetching from the cursor if the row
    /// is not yet cached.
    ///
    /// Absent values come back as the configured placeholder text, or as
    /// the raw `CellValue::Null` when `raw_nulls` is set. A row beyond the
    /// exhausted result is absent. Emits `RowsInserted` for rows a fetch
    /// appended and `RowsRemoved` for the retracted phantom row when the
    /// fetch hits end of data.
    pub fn value_at(&mut self, row: usize, col: usize, raw_nulls: bool) -> CellValue {
        let report = match self.materializer.as_mut() {
            Some(materializer) => materializer.fetch_to(row, &mut self.error_hook),
            None => FetchReport::default(),
        };
        if let Some((first, last)) = report.inserted {
            self.emit(GridEvent::RowsInserted { first, last });
        }
        if let Some(index) = report.phantom_retracted {
            self.emit(GridEvent::RowsRemoved {
                first: index,
                last: index,
            });
        }

        let cell = self
            .materializer
            .as_ref()
            .and_then(|m| m.cell(row, col))
            .cloned()
            .unwrap_or(CellValue::Null);
        if cell.is_null() && !raw_nulls {
            CellValue::Text(self.null_placeholder.clone())
        } else {
            cell
        }
    }

    /// Report a fetch-time failure through the configured hook.
    ///
    /// Driver glue can call this for failures the engine itself cannot
    /// observe, keeping all recovered errors in one place.
    pub fn handle_error(&mut self, error: &Error) {
        (self.error_hook)(error);
    }

    fn is_attached_to(&self, source: &SourceHandle) -> bool {
        self.materializer.is_some()
            && self
                .attached
                .as_ref()
                .is_some_and(|attached| attached.ptr_eq(&Rc::downgrade(source)))
    }

    fn capture_columns(&mut self, source: &SourceHandle) -> Result<Vec<ColumnDescriptor>> {
        let src = source.borrow();
        let count = src
            .column_count()
            .map_err(|e| Error::attach(e.to_string()))?;
        let mut columns = Vec::with_capacity(count);
        for ordinal in 0..count {
            match src.column_meta(ordinal) {
                Ok(meta) => columns.push(ColumnDescriptor::from_meta(meta, ordinal)),
                Err(e) => {
                    (self.error_hook)(&e);
                    columns.push(ColumnDescriptor::fallback(ordinal));
                }
            }
        }
        Ok(columns)
    }

    fn emit(&mut self, event: GridEvent) {
        for subscriber in &mut self.subscribers {
            subscriber(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnMeta;
    use crate::testing::VecSource;

    fn make_test_source() -> VecSource {
        VecSource::new(
            vec![ColumnMeta::new("ID", 2), ColumnMeta::new("NAME", 1)],
            vec![
                vec![CellValue::Integer(1), CellValue::Text("ada".into())],
                vec![CellValue::Integer(2), CellValue::Null],
                vec![CellValue::Integer(3), CellValue::Text("lin".into())],
            ],
        )
    }

    #[test]
    fn test_unattached_metadata_fallbacks() {
        let model = GridModel::default();
        assert_eq!(model.column_count(), 0);
        assert_eq!(model.row_count(), 0);
        assert_eq!(model.column_name(0), "Column 1");
        assert_eq!(model.column_type(4), GENERIC_TEXT_TYPE);
        assert!(model.is_exhausted());
    }

    #[test]
    fn test_attach_captures_metadata() {
        let mut model = GridModel::new(GridConfig::windowed(2));
        model.attach(make_test_source().into_handle()).unwrap();

        assert_eq!(model.column_count(), 2);
        assert_eq!(model.column_names(), vec!["ID", "NAME"]);
        assert_eq!(model.column_type(0), 2);
        // Out of range still falls back.
        assert_eq!(model.column_name(2), "Column 3");
    }

    #[test]
    fn test_attach_metadata_failure_leaves_model_unattached() {
        let mut model = GridModel::default();
        let result = model.attach(make_test_source().with_metadata_failure().into_handle());

        assert!(matches!(result, Err(Error::Attach { .. })));
        assert!(!model.is_attached());
        assert_eq!(model.column_count(), 0);
    }

    #[test]
    fn test_column_level_metadata_failure_falls_back() {
        let mut model = GridModel::new(GridConfig::windowed(2));
        // Hooks are boxed; collect into a shared vec for inspection.
        let errors = Rc::new(RefCell::new(Vec::new()));
        let sink = errors.clone();
        model.set_error_hook(move |e| sink.borrow_mut().push(e.to_string()));

        model
            .attach(
                make_test_source()
                    .with_column_meta_failure(1)
                    .into_handle(),
            )
            .unwrap();

        assert_eq!(model.column_names(), vec!["ID", "Column 2"]);
        assert_eq!(model.column_type(1), GENERIC_TEXT_TYPE);
        assert_eq!(errors.borrow().len(), 1);
    }

    #[test]
    fn test_null_policy_applied_at_read_time() {
        let mut model =
            GridModel::new(GridConfig::windowed(10).with_null_placeholder("(null)"));
        model.attach(make_test_source().into_handle()).unwrap();

        assert_eq!(
            model.value_at(1, 1, false),
            CellValue::Text("(null)".into())
        );
        assert_eq!(model.value_at(1, 1, true), CellValue::Null);
        // Present values are unaffected by the flag.
        assert_eq!(model.value_at(0, 1, false), CellValue::Text("ada".into()));
    }

    #[test]
    fn test_idempotent_attach_emits_nothing() {
        let mut model = GridModel::new(GridConfig::windowed(2));
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        model.subscribe(move |e| sink.borrow_mut().push(*e));

        let handle = make_test_source().into_handle();
        model.attach(handle.clone()).unwrap();
        assert_eq!(
            events.borrow().as_slice(),
            &[GridEvent::StructureChanged, GridEvent::DataReset]
        );

        model.value_at(0, 0, false);
        let count_after_read = events.borrow().len();

        // Same instance again: no re-materialization, no events.
        model.attach(handle).unwrap();
        assert_eq!(events.borrow().len(), count_after_read);
        assert_eq!(model.cached_row_count(), 2);
    }

    #[test]
    fn test_reattach_different_cursor_releases_previous() {
        let mut model = GridModel::new(GridConfig::windowed(2));
        let first = make_test_source();
        let first_releases = first.release_count();
        model.attach(first.into_handle()).unwrap();
        model.value_at(0, 0, false);

        model.attach(make_test_source().into_handle()).unwrap();
        assert_eq!(first_releases.get(), 1);
        assert_eq!(model.cached_row_count(), 0);
    }

    #[test]
    fn test_detach_cancels_active_cursor() {
        let mut model = GridModel::new(GridConfig::windowed(1));
        let source = make_test_source();
        let releases = source.release_count();
        model.attach(source.into_handle()).unwrap();
        model.value_at(0, 0, false);

        model.detach();
        assert_eq!(releases.get(), 1);
        assert!(!model.is_attached());
        assert_eq!(model.row_count(), 0);
        assert_eq!(model.column_count(), 0);

        // Detaching again is a no-op.
        model.detach();
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn test_eager_attach_reports_true_count_immediately() {
        let mut model = GridModel::new(GridConfig::eager());
        let source = make_test_source();
        let releases = source.release_count();
        model.attach(source.into_handle()).unwrap();

        assert_eq!(releases.get(), 1); // released before any read
        assert_eq!(model.row_count(), 3);
        assert!(model.is_exhausted());
        assert_eq!(model.value_at(2, 0, true), CellValue::Integer(3));
    }
}
