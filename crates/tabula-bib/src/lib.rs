//! # tabula-bib
//!
//! BibTeX import for tabula.
//!
//! [`BibliographyImporter`] parses a `.bib` file and turns every entry into
//! one row of a fixed set of columns (see [`BIB_COLUMNS`]). The `Page Count`
//! column comes from a [`PageCountResolver`]; anything that keeps a count
//! from being found is reported as an [`ImportWarning`] instead of failing
//! the import.
//!
//! ```rust
//! use tabula_bib::{parse_str, BibliographyImporter, ImportWarning};
//!
//! let entries = parse_str("@article{k, title = {T}, pages = {10--19}}").unwrap();
//! let mut warnings: Vec<ImportWarning> = Vec::new();
//! let sheet = BibliographyImporter::new()
//!     .to_sheet(&entries, "BibTeX", &mut warnings)
//!     .unwrap();
//! assert_eq!(sheet.table().get(0, "Page Count").and_then(|v| v.as_integer()), Some(10));
//! ```

pub mod entry;
pub mod error;
pub mod importer;
pub mod page_count;
pub mod parser;
pub mod report;

pub use entry::BibEntry;
pub use error::{BibError, BibResult};
pub use importer::{BibliographyImporter, BIB_COLUMNS, DEFAULT_SHEET_NAME};
pub use page_count::{
    PageCount, PageCountResolver, PageCountSource, PageCountStrategy, PageRange, PdfFile,
};
pub use parser::{parse_file, parse_str};
pub use report::{ImportWarning, LogReporter, Reporter};
