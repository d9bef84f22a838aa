//! Non-fatal import diagnostics

use std::path::PathBuf;

use thiserror::Error;

/// A problem that leaves one cell empty but does not stop the import
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportWarning {
    /// `pages` looks like `start--end` but its bounds are not integers
    #[error("invalid page range '{pages}'")]
    InvalidPageRange { pages: String },

    /// The `file` field names a PDF that does not exist
    #[error("PDF not found: '{}'", path.display())]
    PdfNotFound { path: PathBuf },

    /// The PDF exists but could not be opened or its pages counted
    #[error("could not read PDF '{}': {message}", path.display())]
    PdfUnreadable { path: PathBuf, message: String },
}

/// Receiver of [`ImportWarning`]s
pub trait Reporter {
    /// Record one warning
    fn report(&mut self, warning: ImportWarning);
}

/// Collects warnings, mostly for tests and callers that summarize at the end
impl Reporter for Vec<ImportWarning> {
    fn report(&mut self, warning: ImportWarning) {
        self.push(warning);
    }
}

/// Forwards warnings to `log::warn!`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&mut self, warning: ImportWarning) {
        log::warn!("{}", warning);
    }
}
