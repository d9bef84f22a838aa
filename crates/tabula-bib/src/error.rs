//! Bibliography error types

use thiserror::Error;

/// Result type for bibliography operations
pub type BibResult<T> = std::result::Result<T, BibError>;

/// Errors that abort a bibliography import.
///
/// Problems with a single entry's page count are not errors; they go to a
/// [`Reporter`](crate::Reporter) instead.
#[derive(Debug, Error)]
pub enum BibError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed BibTeX
    #[error("Syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] tabula_core::Error),
}
