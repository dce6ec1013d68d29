//! Error types for the storage engine and the statement dispatcher.

use std::io;

use thiserror::Error;

use crate::data_type::DataType;

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while executing a statement or loading/saving the catalog.
#[derive(Debug, Error)]
pub enum Error {
    /// A table with this name is already in the catalog.
    #[error("table '{table}' already exists")]
    TableExists { table: String },

    /// The table is not in the catalog.
    #[error("table '{table}' does not exist")]
    TableNotFound { table: String },

    /// A table must declare at least one column.
    #[error("table '{table}' has no columns")]
    NoColumns { table: String },

    /// Column names are unique within a table.
    #[error("column '{column}' is declared twice in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// The column is not part of the table schema.
    #[error("column '{column}' does not exist in table '{table}'")]
    ColumnNotFound { table: String, column: String },

    /// A row does not carry exactly one value per column.
    #[error("column count mismatch: table '{table}' has {expected} columns, row has {actual}")]
    ArityMismatch {
        table: String,
        expected: usize,
        actual: usize,
    },

    /// A value does not match the declared type of its column.
    #[error("column '{column}' is {expected}, got {actual} value")]
    TypeMismatch {
        column: String,
        expected: DataType,
        actual: DataType,
    },

    /// The statement could not be turned into an executable command.
    #[error("invalid statement: {0}")]
    Parse(String),

    /// The database file is truncated or not in a known format.
    #[error("corrupt database file at byte {offset}: {reason}")]
    Decode { offset: usize, reason: String },

    /// Reading or writing the database file failed.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn table_not_found(table: &str) -> Self {
        Self::TableNotFound {
            table: table.to_string(),
        }
    }

    pub(crate) fn column_not_found(table: &str, column: &str) -> Self {
        Self::ColumnNotFound {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}
