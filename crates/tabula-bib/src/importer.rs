//! Bibliography entries to sheet rows

use std::path::Path;

use crate::entry::{BibEntry, ENTRY_TYPE_FIELD, ID_FIELD};
use crate::error::BibResult;
use crate::page_count::PageCountResolver;
use crate::parser;
use crate::report::Reporter;
use tabula_core::{CellValue, Sheet, Table};

/// Sheet name used when the caller does not pick one
pub const DEFAULT_SHEET_NAME: &str = "BibTeX";

/// Column that receives the resolved page count
pub const PAGE_COUNT_COLUMN: &str = "Page Count";

/// Output columns, in order, with the entry field each one is read from.
/// [`PAGE_COUNT_COLUMN`] is computed instead.
pub const BIB_COLUMNS: [(&str, &str); 17] = [
    ("ID", ID_FIELD),
    ("Type", ENTRY_TYPE_FIELD),
    ("Title", "title"),
    ("Author(s)", "author"),
    ("Year", "year"),
    ("Journal", "journal"),
    ("Volume", "volume"),
    ("Number", "number"),
    ("Pages", "pages"),
    (PAGE_COUNT_COLUMN, ""),
    ("DOI", "doi"),
    ("URL", "url"),
    ("Keywords", "keywords"),
    ("Abstract", "abstract"),
    ("Publisher", "publisher"),
    ("ISSN", "issn"),
    ("File", "file"),
];

/// Builds a bibliography sheet: one row per entry, fixed columns.
#[derive(Debug, Default)]
pub struct BibliographyImporter {
    resolver: PageCountResolver,
}

impl BibliographyImporter {
    /// Importer with the default page count chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Importer using a custom page count chain
    pub fn with_resolver(resolver: PageCountResolver) -> Self {
        Self { resolver }
    }

    /// Column names of the produced sheet
    pub fn columns() -> impl Iterator<Item = &'static str> {
        BIB_COLUMNS.iter().map(|(column, _)| *column)
    }

    /// Parse a BibTeX file
    pub fn parse<P: AsRef<Path>>(path: P) -> BibResult<Vec<BibEntry>> {
        parser::parse_file(path)
    }

    /// Row for one entry. Missing fields are empty strings; the page count
    /// is empty when it cannot be determined.
    pub fn row(&self, entry: &BibEntry, reporter: &mut dyn Reporter) -> Vec<CellValue> {
        BIB_COLUMNS
            .iter()
            .map(|(column, field)| {
                if *column == PAGE_COUNT_COLUMN {
                    let count = self
                        .resolver
                        .resolve(entry.get("pages"), entry.get("file"), reporter);
                    count.map_or(CellValue::Empty, CellValue::Integer)
                } else {
                    CellValue::string(entry.get(field))
                }
            })
            .collect()
    }

    /// Sheet with one row per entry, in order
    pub fn to_sheet(
        &self,
        entries: &[BibEntry],
        sheet_name: &str,
        reporter: &mut dyn Reporter,
    ) -> BibResult<Sheet> {
        let rows = entries
            .iter()
            .map(|entry| self.row(entry, reporter))
            .collect();
        let table = Table::from_rows(Self::columns(), rows)?;
        Ok(Sheet::new(sheet_name, table))
    }

    /// Parse `path` and build the sheet, with LaTeX escapes decoded in every
    /// text column.
    pub fn import<P: AsRef<Path>>(
        &self,
        path: P,
        sheet_name: &str,
        reporter: &mut dyn Reporter,
    ) -> BibResult<Sheet> {
        let path = path.as_ref();
        let entries = Self::parse(path)?;
        log::debug!("parsed {} entries from {}", entries.len(), path.display());

        let mut sheet = self.to_sheet(&entries, sheet_name, reporter)?;
        sheet.decode_latex_escapes(None);
        Ok(sheet)
    }
}
