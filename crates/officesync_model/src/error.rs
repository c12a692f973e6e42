//! Error types for the row codec.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding a backend row.
///
/// Encoding is infallible; decoding only fails when a row cannot be
/// identified at all. Ill-typed optional columns fall back to defaults.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The row has no usable primary key.
    #[error("row in table {table} has no primary key")]
    MissingPrimaryKey {
        /// Table the row came from.
        table: &'static str,
    },

    /// A required column holds a value of the wrong shape.
    #[error("column {column} in table {table}: expected {expected}")]
    InvalidColumn {
        /// Table the row came from.
        table: &'static str,
        /// Column name.
        column: &'static str,
        /// Description of the expected shape.
        expected: &'static str,
    },
}

impl CodecError {
    /// Returns the table the failing row belongs to.
    pub fn table(&self) -> &'static str {
        match self {
            CodecError::MissingPrimaryKey { table } => table,
            CodecError::InvalidColumn { table, .. } => table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CodecError::MissingPrimaryKey { table: "rooms" };
        assert_eq!(err.to_string(), "row in table rooms has no primary key");
        assert_eq!(err.table(), "rooms");

        let err = CodecError::InvalidColumn {
            table: "mc_tasks",
            column: "title",
            expected: "string",
        };
        assert!(err.to_string().contains("title"));
        assert_eq!(err.table(), "mc_tasks");
    }
}
