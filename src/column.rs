//! Column descriptor types.
//!
//! `ColumnMeta` is the raw, driver-reported shape returned by a `RowSource`.
//! `ColumnDescriptor` is the model's captured, user-facing representation,
//! fixed once per attached cursor.

/// Driver type code substituted when a column's real type cannot be read.
pub const GENERIC_TEXT_TYPE: i32 = 0;

/// Raw column metadata as reported by a row source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    /// Column name.
    pub name: String,
    /// Driver-specific type code.
    pub type_code: i32,
}

impl ColumnMeta {
    /// Create column metadata.
    pub fn new(name: impl Into<String>, type_code: i32) -> Self {
        Self {
            name: name.into(),
            type_code,
        }
    }
}

/// A column of an attached result, captured once at attach time.
///
/// Immutable thereafter; replaced wholesale when the model is detached or
/// reattached to a different cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Column name (driver-reported or synthesized).
    pub name: String,
    /// Driver type code (`GENERIC_TEXT_TYPE` when synthesized).
    pub type_code: i32,
    /// Zero-based column position.
    pub ordinal: usize,
}

impl ColumnDescriptor {
    /// Create a descriptor from driver-reported metadata.
    pub fn from_meta(meta: ColumnMeta, ordinal: usize) -> Self {
        Self {
            name: meta.name,
            type_code: meta.type_code,
            ordinal,
        }
    }

    /// Create the fallback descriptor used when a column's metadata is
    /// unreadable: a synthesized name and a generic text type.
    pub fn fallback(ordinal: usize) -> Self {
        Self {
            name: Self::fallback_name(ordinal),
            type_code: GENERIC_TEXT_TYPE,
            ordinal,
        }
    }

    /// The synthesized name for a column at the given position ("Column 1",
    /// "Column 2", ...).
    pub fn fallback_name(ordinal: usize) -> String {
        format!("Column {}", ordinal + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_from_meta() {
        let desc = ColumnDescriptor::from_meta(ColumnMeta::new("ID", 2), 0);
        assert_eq!(desc.name, "ID");
        assert_eq!(desc.type_code, 2);
        assert_eq!(desc.ordinal, 0);
    }

    #[test]
    fn test_fallback_descriptor() {
        let desc = ColumnDescriptor::fallback(2);
        assert_eq!(desc.name, "Column 3");
        assert_eq!(desc.type_code, GENERIC_TEXT_TYPE);
        assert_eq!(desc.ordinal, 2);
    }
}
