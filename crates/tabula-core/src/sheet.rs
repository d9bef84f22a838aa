//! Sheet type - a named table

use std::fmt;

use crate::error::Result;
use crate::latex::decode_latex;
use crate::table::Table;
use crate::value::CellValue;

/// Columns converted to nullable integers by [`Sheet::coerce_column_types`]
pub const INTEGER_COLUMNS: [&str; 2] = ["Year", "Page Count"];

/// Column split into [`KEYWORD_LIST_COLUMN`] by [`Sheet::coerce_column_types`]
pub const KEYWORDS_COLUMN: &str = "Keywords";

/// Derived list-of-keywords column
pub const KEYWORD_LIST_COLUMN: &str = "KeywordList";

/// A named table.
///
/// Every operation that derives a new table from a sheet returns a new
/// `Sheet` carrying the same name; the derived sheet owns its own storage.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sheet {
    /// Sheet name
    name: String,
    /// Sheet contents
    table: Table,
}

impl Sheet {
    /// Create a new sheet
    pub fn new<S: Into<String>>(name: S, table: Table) -> Self {
        Self {
            name: name.into(),
            table,
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renaming goes through [`Workbook::rename_sheet`](crate::Workbook::rename_sheet)
    /// so the workbook key and the sheet name never diverge.
    pub(crate) fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    /// Get the underlying table
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Get the underlying table mutably
    pub fn table_mut(&mut self) -> &mut Table {
        &mut self.table
    }

    /// Take the underlying table
    pub fn into_table(self) -> Table {
        self.table
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    /// Column names
    pub fn columns(&self) -> &[String] {
        self.table.columns()
    }

    /// Derive a new sheet with the same name from a function of this table
    pub fn map_table<F: FnOnce(&Table) -> Table>(&self, f: F) -> Sheet {
        Sheet::new(self.name.clone(), f(&self.table))
    }

    /// A new sheet with only the given columns
    pub fn select(&self, columns: &[&str]) -> Result<Sheet> {
        Ok(Sheet::new(self.name.clone(), self.table.select(columns)?))
    }

    /// A new sheet with the rows of `other` appended (see [`Table::concat`])
    pub fn concat(&self, other: &Sheet) -> Sheet {
        self.map_table(|table| table.concat(&other.table))
    }

    /// Return a copy of this sheet with one more row.
    ///
    /// `values` are matched to the existing columns by name; columns without
    /// a value are empty and unknown names are ignored. The row goes to
    /// `index`, or at the end when `index` is `None` or past the last row.
    /// This sheet is not modified.
    pub fn insert_row<I, K, V>(&self, values: I, index: Option<usize>) -> Sheet
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<CellValue>,
    {
        let mut table = self.table.clone();
        let index = index.unwrap_or(table.row_count());
        table.insert_record(index, values);
        Sheet::new(self.name.clone(), table)
    }

    /// Replace LaTeX accent escapes with Unicode and strip literal braces in
    /// text cells.
    ///
    /// With `None` every column is processed. Non-text values and unknown
    /// column names are left alone.
    pub fn decode_latex_escapes(&mut self, columns: Option<&[&str]>) {
        let selected: Vec<String> = match columns {
            Some(names) => names.iter().map(|n| (*n).to_string()).collect(),
            None => self.table.columns().to_vec(),
        };

        for column in &selected {
            self.table.map_column(column, |value| match value {
                CellValue::String(text) => CellValue::String(decode_latex(text)),
                other => other.clone(),
            });
        }
    }

    /// Apply the bibliography column types.
    ///
    /// `Year` and `Page Count` (when present) become nullable integers, with
    /// non-numeric values turned empty. When `Keywords` is present, a
    /// `KeywordList` column is (re)built holding the trimmed, non-empty
    /// comma-separated keywords of each row.
    pub fn coerce_column_types(&mut self) {
        for column in INTEGER_COLUMNS {
            self.table.coerce_integer(column);
        }

        let keyword_lists: Option<Vec<CellValue>> = self.table.column(KEYWORDS_COLUMN).map(|values| {
            values
                .map(|value| CellValue::List(split_keywords(value)))
                .collect()
        });

        if let Some(lists) = keyword_lists {
            self.table.set_column(KEYWORD_LIST_COLUMN, lists);
        }
    }
}

fn split_keywords(value: &CellValue) -> Vec<String> {
    match value {
        CellValue::Empty => Vec::new(),
        CellValue::List(items) => items.clone(),
        other => other
            .to_string()
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
            .collect(),
    }
}

impl fmt::Display for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sheet: '{}' ({} rows x {} columns)",
            self.name,
            self.table.row_count(),
            self.table.column_count()
        )
    }
}
