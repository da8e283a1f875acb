//! Model configuration.
//!
//! The surrounding application owns where configuration comes from (file,
//! dialog, defaults); this crate only defines the shape it consumes.

use serde::Deserialize;

/// Default read-ahead page size, in rows.
pub const DEFAULT_PAGE_SIZE: usize = 256;

/// Configuration consumed by a [`GridModel`](crate::GridModel).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Rows of read-ahead per demand for the windowed strategy.
    ///
    /// `Some(0)` means no bound: the first demand reads to exhaustion.
    /// `None` selects the eager strategy, which drains the cursor at attach
    /// time instead of fetching on demand.
    pub page_size: Option<usize>,
    /// String substituted for absent values at read time.
    pub null_placeholder: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: Some(DEFAULT_PAGE_SIZE),
            null_placeholder: "NULL".to_string(),
        }
    }
}

impl GridConfig {
    /// Windowed strategy with the given page size.
    pub fn windowed(page_size: usize) -> Self {
        Self {
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    /// Eager strategy: full materialization at attach time.
    pub fn eager() -> Self {
        Self {
            page_size: None,
            ..Self::default()
        }
    }

    /// Override the placeholder substituted for absent values.
    pub fn with_null_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.null_placeholder = placeholder.into();
        self
    }
}
