//! Options for [`WorkbookExt::add_from_file`](crate::WorkbookExt::add_from_file)

/// How to bring a file into an existing workbook.
///
/// ```rust
/// use tabula::FileImport;
///
/// let import = FileImport::new().sheet_name("Prices").delimiter(b';');
/// assert_eq!(import.delimiter, b';');
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileImport {
    /// Name for the new sheet. For `.xlsx` it only applies when exactly one
    /// sheet is selected.
    pub sheet_name: Option<String>,
    /// Field delimiter for `.csv` files (`.tsv` always uses tab)
    pub delimiter: u8,
    /// Printer-style selection of `.xlsx` sheets ("1-3,5"); all when `None`
    pub sheets: Option<String>,
}

impl Default for FileImport {
    fn default() -> Self {
        Self {
            sheet_name: None,
            delimiter: b',',
            sheets: None,
        }
    }
}

impl FileImport {
    /// Default options: comma delimiter, every sheet, names from the file
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sheet name
    pub fn sheet_name<S: Into<String>>(mut self, name: S) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    /// Set the CSV delimiter
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Select `.xlsx` sheets by a printer-style range
    pub fn sheets<S: Into<String>>(mut self, range: S) -> Self {
        self.sheets = Some(range.into());
        self
    }
}
