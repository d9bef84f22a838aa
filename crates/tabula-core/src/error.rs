//! Error types for tabula-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tabula-core
#[derive(Debug, Error)]
pub enum Error {
    /// Sheet not found by name
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// Duplicate sheet name
    #[error("Sheet name already exists: {0}")]
    DuplicateSheetName(String),

    /// File extension the workbook cannot ingest
    #[error("Unsupported file format '{0}' (expected .csv, .tsv or .xlsx)")]
    UnsupportedFormat(String),

    /// Malformed token in a printer-style range string
    #[error("Invalid range token '{token}': {reason}")]
    RangeParse { token: String, reason: String },

    /// Column not found by name
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// A row has more cells than the table has columns
    #[error("Row {row} has {width} cells but the table has {columns} columns")]
    RowTooWide {
        row: usize,
        width: usize,
        columns: usize,
    },

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    pub(crate) fn range<T: Into<String>, R: Into<String>>(token: T, reason: R) -> Self {
        Error::RangeParse {
            token: token.into(),
            reason: reason.into(),
        }
    }
}
