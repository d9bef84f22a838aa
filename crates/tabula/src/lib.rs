//! # tabula
//!
//! Multi-sheet workbooks assembled from delimited text, XLSX and BibTeX
//! files, exported as a single XLSX file.
//!
//! ## Features
//!
//! - Import CSV/TSV files as one sheet each
//! - Import some or all sheets of an XLSX file with printer-style ranges ("1-3,5")
//! - Turn a BibTeX bibliography into a sheet with page counts
//! - Copy, rename and remove sheets; export every sheet to one XLSX file
//!
//! ## Example
//!
//! ```rust,no_run
//! use tabula::prelude::*;
//!
//! let mut workbook = Workbook::from_spreadsheet("report.xlsx", Some("1-2"))?;
//! workbook.add_from_file("extra.tsv", &FileImport::new().sheet_name("Extra"))?;
//! workbook.rename_sheet("Extra", "Appendix")?;
//! workbook.to_spreadsheet("merged.xlsx")?;
//! # Ok::<(), tabula::Error>(())
//! ```

pub mod error;
pub mod options;
pub mod prelude;

pub use error::{Error, Result};
pub use options::FileImport;

// Re-export core types
pub use tabula_core::{decode_latex, CellValue, RangeSpec, Sheet, Table, Workbook};

// Re-export I/O types
pub use tabula_bib::{
    BibEntry, BibError, BibliographyImporter, ImportWarning, LogReporter, PageCount,
    PageCountResolver, PageCountSource, Reporter, DEFAULT_SHEET_NAME,
};
pub use tabula_csv::{CsvError, CsvReadOptions, CsvReader};
pub use tabula_xlsx::{XlsxError, XlsxReader, XlsxWriter};

use std::path::Path;

/// Name of workbooks built by [`WorkbookExt::from_bibliography`]
pub const BIBLIOGRAPHY_WORKBOOK_NAME: &str = "bibliography";

/// Extension trait for Workbook to add file ingestion and export
pub trait WorkbookExt: Sized {
    /// Read an `.xlsx` file into a new workbook named after the file stem.
    ///
    /// `sheets` selects sheets by 1-based printer-style range; positions past
    /// the last sheet are skipped. The range is validated before the file is
    /// opened.
    fn from_spreadsheet<P: AsRef<Path>>(path: P, sheets: Option<&str>) -> Result<Self>;

    /// Add the contents of a `.csv`, `.tsv` or `.xlsx` file as new sheets,
    /// replacing sheets of the same name.
    fn add_from_file<P: AsRef<Path>>(&mut self, path: P, options: &FileImport) -> Result<()>;

    /// Build a workbook holding one sheet made from a BibTeX file.
    /// Page count problems are logged.
    fn from_bibliography<P: AsRef<Path>>(path: P, sheet_name: Option<&str>) -> Result<Self> {
        Self::from_bibliography_with(path, sheet_name, &mut LogReporter)
    }

    /// Like [`from_bibliography`](Self::from_bibliography), sending page
    /// count problems to `reporter`
    fn from_bibliography_with<P: AsRef<Path>>(
        path: P,
        sheet_name: Option<&str>,
        reporter: &mut dyn Reporter,
    ) -> Result<Self>;

    /// Write every sheet, in order, to one `.xlsx` file
    fn to_spreadsheet<P: AsRef<Path>>(&self, path: P) -> Result<()>;
}

impl WorkbookExt for Workbook {
    fn from_spreadsheet<P: AsRef<Path>>(path: P, sheets: Option<&str>) -> Result<Workbook> {
        let path = path.as_ref();
        let range = sheets.map(RangeSpec::parse).transpose()?;

        let mut reader = XlsxReader::open(path)?;
        let selected = selected_sheets(range.as_ref(), reader.sheet_count(), path);

        let mut workbook = Workbook::new(file_stem(path));
        for index in selected {
            workbook.insert_sheet(reader.read_sheet(index)?);
        }

        log::debug!("read {} from {}", workbook, path.display());
        Ok(workbook)
    }

    fn add_from_file<P: AsRef<Path>>(&mut self, path: P, options: &FileImport) -> Result<()> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("csv") | Some("tsv") => {
                let read_options = if extension.as_deref() == Some("tsv") {
                    CsvReadOptions::tsv()
                } else {
                    CsvReadOptions::default().with_delimiter(options.delimiter)
                };
                let table = CsvReader::read_file(path, &read_options)?;
                let name = options
                    .sheet_name
                    .clone()
                    .unwrap_or_else(|| base_name(path));
                log::debug!("adding sheet '{}' from {}", name, path.display());
                self.add_sheet(name, table);
                Ok(())
            }
            Some("xlsx") => {
                let range = options
                    .sheets
                    .as_deref()
                    .map(RangeSpec::parse)
                    .transpose()?;

                let mut reader = XlsxReader::open(path)?;
                // the rename rule looks at what was asked for, not what exists
                let requested = range.as_ref().map_or(reader.sheet_count(), RangeSpec::len);
                let selected = selected_sheets(range.as_ref(), reader.sheet_count(), path);

                match (requested, options.sheet_name.as_deref()) {
                    (1, Some(name)) => {
                        if let Some(&index) = selected.first() {
                            self.add_sheet(name, reader.read_sheet(index)?.into_table());
                        }
                    }
                    _ => {
                        for index in selected {
                            self.insert_sheet(reader.read_sheet(index)?);
                        }
                    }
                }
                Ok(())
            }
            _ => Err(tabula_core::Error::UnsupportedFormat(path.display().to_string()).into()),
        }
    }

    fn from_bibliography_with<P: AsRef<Path>>(
        path: P,
        sheet_name: Option<&str>,
        reporter: &mut dyn Reporter,
    ) -> Result<Workbook> {
        let sheet_name = sheet_name.unwrap_or(DEFAULT_SHEET_NAME);
        let sheet = BibliographyImporter::new().import(path, sheet_name, reporter)?;

        let mut workbook = Workbook::new(BIBLIOGRAPHY_WORKBOOK_NAME);
        workbook.insert_sheet(sheet);
        Ok(workbook)
    }

    fn to_spreadsheet<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        XlsxWriter::write_file(self, path)?;
        Ok(())
    }
}

/// Sheet positions to read from a file with `count` sheets: all of them, or
/// the part of `range` that exists
fn selected_sheets(range: Option<&RangeSpec>, count: usize, path: &Path) -> Vec<usize> {
    let Some(range) = range else {
        return (0..count).collect();
    };

    let selected = range.resolve(count);
    if selected.len() < range.len() {
        log::debug!(
            "{} has {} sheets, skipping positions of '{}' past the last one",
            path.display(),
            count,
            range
        );
    }
    selected
}

/// File name without its last extension
fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// File name up to its first '.'
fn base_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split_once('.') {
        Some((base, _)) => base.to_string(),
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_from_paths() {
        assert_eq!(file_stem(Path::new("/data/report.2024.xlsx")), "report.2024");
        assert_eq!(base_name(Path::new("/data/report.2024.csv")), "report");
        assert_eq!(base_name(Path::new("plain")), "plain");
    }

    #[test]
    fn test_selected_sheets_bounded_by_file() {
        let path = Path::new("book.xlsx");
        let huge = RangeSpec::parse("2-18446744073709551615").unwrap();
        assert_eq!(selected_sheets(Some(&huge), 3, path), vec![1, 2]);
        assert_eq!(selected_sheets(None, 2, path), vec![0, 1]);
        assert!(selected_sheets(Some(&huge), 1, path).is_empty());
    }

    #[test]
    fn test_unsupported_extension() {
        let mut workbook = Workbook::new("w");
        let err = workbook
            .add_from_file("notes.txt", &FileImport::new())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Core(tabula_core::Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_bad_range_fails_before_reading() {
        // the file does not exist; the range error wins
        let err = Workbook::from_spreadsheet("missing.xlsx", Some("3-1")).unwrap_err();
        assert!(matches!(
            err,
            Error::Core(tabula_core::Error::RangeParse { .. })
        ));
    }
}
