//! Error types for the result materialization engine.

use thiserror::Error;

/// Result type alias for materialization operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for result materialization operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Attaching a cursor failed because its metadata was unreadable as a whole.
    ///
    /// The model is left unattached when this is returned.
    #[error("Failed to attach cursor: {message}")]
    Attach { message: String },

    /// Metadata for a single column could not be read.
    ///
    /// Recovered by substituting a synthesized column name and a generic
    /// text type; never fatal to the attach.
    #[error("Metadata unavailable for column {column}: {message}")]
    Metadata { column: usize, message: String },

    /// A cell value could not be read or converted during a fetch.
    ///
    /// Recovered by storing a NULL for the offending cell; the fetch loop
    /// continues with the next cell.
    #[error("Failed to read cell at row {row}, column {column}: {message}")]
    CellRead {
        row: usize,
        column: usize,
        message: String,
    },

    /// The driver failed while advancing the cursor.
    #[error("Cursor error: {message}")]
    Cursor { message: String },

    /// Column index out of bounds.
    #[error("Column index {index} out of bounds (columns: {count})")]
    ColumnIndexOutOfBounds { index: usize, count: usize },
}

impl Error {
    /// Create an attach error.
    pub fn attach(message: impl Into<String>) -> Self {
        Self::Attach {
            message: message.into(),
        }
    }

    /// Create a column metadata error.
    pub fn metadata(column: usize, message: impl Into<String>) -> Self {
        Self::Metadata {
            column,
            message: message.into(),
        }
    }

    /// Create a cell read error.
    pub fn cell_read(row: usize, column: usize, message: impl Into<String>) -> Self {
        Self::CellRead {
            row,
            column,
            message: message.into(),
        }
    }

    /// Create a cursor error.
    pub fn cursor(message: impl Into<String>) -> Self {
        Self::Cursor {
            message: message.into(),
        }
    }
}
