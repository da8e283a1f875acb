//! Result materialization engine for database browsers.
//!
//! Adapts a forward-only, single-pass database cursor into a random-access
//! tabular data provider suitable for incremental display: the full result
//! never has to reside in memory up front, and the cursor never has to
//! scroll backward. Rows are pulled in bounded pages only when a read
//! crosses the cached boundary, and a provisional "phantom" row in the
//! visible count signals that more data may exist until the cursor is
//! drained and released.
//!
//! Statement execution, connection management, and rendering are out of
//! scope; driver glue implements [`RowSource`] on top of whatever runs the
//! statement, and the display layer consumes [`GridModel`].
//!
//! # Example
//!
//! ```
//! use gridrow::testing::VecSource;
//! use gridrow::{CellValue, ColumnMeta, GridConfig, GridModel};
//!
//! let source = VecSource::new(
//!     vec![ColumnMeta::new("ID", 2), ColumnMeta::new("NAME", 1)],
//!     vec![
//!         vec![CellValue::Integer(1), CellValue::Text("ada".into())],
//!         vec![CellValue::Integer(2), CellValue::Null],
//!     ],
//! );
//!
//! let mut model = GridModel::new(GridConfig::windowed(32).with_null_placeholder("(null)"));
//! model.attach(source.into_handle())?;
//!
//! assert_eq!(model.column_name(1), "NAME");
//! assert_eq!(model.value_at(1, 1, false), CellValue::Text("(null)".into()));
//! assert_eq!(model.value_at(1, 1, true), CellValue::Null);
//! # Ok::<(), gridrow::Error>(())
//! ```

mod cache;
mod fetch;

pub mod column;
pub mod config;
pub mod error;
pub mod model;
pub mod source;
pub mod testing;
pub mod value;

// Re-export main types
pub use column::{ColumnDescriptor, ColumnMeta, GENERIC_TEXT_TYPE};
pub use config::{GridConfig, DEFAULT_PAGE_SIZE};
pub use error::{Error, Result};
pub use model::{GridEvent, GridModel};
pub use source::{RowSource, SourceHandle};
pub use value::CellValue;
