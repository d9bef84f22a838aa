//! Facade error type

use thiserror::Error;

/// Result type for workbook ingestion and export
pub type Result<T> = std::result::Result<T, Error>;

/// Any error from the tabula crates
#[derive(Debug, Error)]
pub enum Error {
    /// Workbook, sheet or range error
    #[error(transparent)]
    Core(#[from] tabula_core::Error),

    /// Delimited text error
    #[error(transparent)]
    Csv(#[from] tabula_csv::CsvError),

    /// XLSX error
    #[error(transparent)]
    Xlsx(#[from] tabula_xlsx::XlsxError),

    /// Bibliography error
    #[error(transparent)]
    Bib(#[from] tabula_bib::BibError),
}
