//! Workbook type - the main document structure

use std::fmt;

use crate::error::{Error, Result};
use crate::sheet::Sheet;
use crate::table::Table;

/// A workbook: a named collection of uniquely-named sheets.
///
/// Sheets keep their insertion order, which is also the order they are
/// exported in. A sheet is addressed by its own name, so the lookup key and
/// [`Sheet::name`] cannot disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    /// Workbook name
    name: String,
    /// Sheets in the workbook
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Create a new empty workbook
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            sheets: Vec::new(),
        }
    }

    /// Get the workbook name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of sheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Check if the workbook has no sheets
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Get a sheet by name
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name() == name)
    }

    /// Get a mutable sheet by name
    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name() == name)
    }

    /// Get the index of a sheet by name
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|s| s.name() == name)
    }

    /// Check if a sheet exists
    pub fn contains_sheet(&self, name: &str) -> bool {
        self.sheet_index(name).is_some()
    }

    /// Iterate over all sheets in order
    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter()
    }

    /// Iterate over all sheets mutably
    pub fn sheets_mut(&mut self) -> impl Iterator<Item = &mut Sheet> {
        self.sheets.iter_mut()
    }

    /// Sheet names in order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(Sheet::name).collect()
    }

    /// Add a sheet wrapping `table`.
    ///
    /// An existing sheet with the same name is replaced in place; there is
    /// no uniqueness check.
    pub fn add_sheet<S: Into<String>>(&mut self, name: S, table: Table) -> &mut Sheet {
        self.insert_sheet(Sheet::new(name, table))
    }

    /// Add an existing sheet under its own name, replacing any sheet of that name
    pub fn insert_sheet(&mut self, sheet: Sheet) -> &mut Sheet {
        let index = match self.sheet_index(sheet.name()) {
            Some(index) => {
                self.sheets[index] = sheet;
                index
            }
            None => {
                self.sheets.push(sheet);
                self.sheets.len() - 1
            }
        };
        &mut self.sheets[index]
    }

    /// Copy a sheet to a new name.
    ///
    /// The copy owns its own data; changing it never affects `source`. A
    /// sheet already named `target` is replaced.
    pub fn copy_sheet(&mut self, source: &str, target: &str) -> Result<&mut Sheet> {
        let mut copy = self
            .sheet(source)
            .cloned()
            .ok_or_else(|| Error::SheetNotFound(source.into()))?;
        copy.set_name(target);
        Ok(self.insert_sheet(copy))
    }

    /// Remove a sheet by name
    pub fn remove_sheet(&mut self, name: &str) -> Result<Sheet> {
        let index = self
            .sheet_index(name)
            .ok_or_else(|| Error::SheetNotFound(name.into()))?;
        Ok(self.sheets.remove(index))
    }

    /// Rename a sheet.
    ///
    /// Fails if `old_name` does not exist or `new_name` is already taken;
    /// on success the sheet keeps its position.
    pub fn rename_sheet(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        let index = self
            .sheet_index(old_name)
            .ok_or_else(|| Error::SheetNotFound(old_name.into()))?;

        if self.contains_sheet(new_name) {
            return Err(Error::DuplicateSheetName(new_name.into()));
        }

        self.sheets[index].set_name(new_name);
        Ok(())
    }
}

impl fmt::Display for Workbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Workbook: {}, sheets: [{}]", self.name, self.sheet_names().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::CellValue;
    use pretty_assertions::assert_eq;

    fn numbers(values: &[i64]) -> Table {
        Table::from_rows(
            ["n"],
            values.iter().map(|&v| vec![CellValue::Integer(v)]).collect(),
        )
        .unwrap()
    }

    fn workbook() -> Workbook {
        let mut wb = Workbook::new("Data");
        wb.add_sheet("A", numbers(&[1, 2]));
        wb.add_sheet("B", numbers(&[3]));
        wb
    }

    #[test]
    fn test_new_workbook() {
        let wb = Workbook::new("Empty");
        assert_eq!(wb.name(), "Empty");
        assert!(wb.is_empty());
        assert!(wb.sheet("anything").is_none());
    }

    #[test]
    fn test_add_sheet_overwrites_in_place() {
        let mut wb = workbook();
        wb.add_sheet("A", numbers(&[9]));

        assert_eq!(wb.sheet_names(), vec!["A", "B"]);
        assert_eq!(wb.sheet("A").unwrap().row_count(), 1);
    }

    #[test]
    fn test_copy_is_independent() {
        let mut wb = workbook();
        wb.copy_sheet("A", "C").unwrap();
        wb.sheet_mut("C")
            .unwrap()
            .table_mut()
            .set(0, "n", 100)
            .unwrap();

        assert_eq!(wb.sheet("A").unwrap().table().get(0, "n"), Some(&CellValue::Integer(1)));
        assert_eq!(wb.sheet("C").unwrap().table().get(0, "n"), Some(&CellValue::Integer(100)));
        assert_eq!(wb.sheet("C").unwrap().name(), "C");
    }

    #[test]
    fn test_copy_overwrites_target() {
        let mut wb = workbook();
        wb.copy_sheet("A", "B").unwrap();
        assert_eq!(wb.sheet_count(), 2);
        assert_eq!(wb.sheet("B").unwrap().row_count(), 2);
    }

    #[test]
    fn test_copy_missing_source() {
        let mut wb = workbook();
        assert!(matches!(
            wb.copy_sheet("Nope", "C"),
            Err(Error::SheetNotFound(name)) if name == "Nope"
        ));
    }

    #[test]
    fn test_remove_sheet() {
        let mut wb = workbook();
        let removed = wb.remove_sheet("A").unwrap();
        assert_eq!(removed.name(), "A");
        assert_eq!(wb.sheet_names(), vec!["B"]);
        assert!(matches!(wb.remove_sheet("A"), Err(Error::SheetNotFound(_))));
    }

    #[test]
    fn test_rename_sheet() {
        let mut wb = workbook();
        let rows_before = wb.sheet("A").unwrap().table().clone();

        wb.rename_sheet("A", "Renamed").unwrap();

        assert!(wb.sheet("A").is_none());
        let renamed = wb.sheet("Renamed").unwrap();
        assert_eq!(renamed.name(), "Renamed");
        assert_eq!(renamed.table(), &rows_before);
        assert_eq!(wb.sheet_names(), vec!["Renamed", "B"]);
    }

    #[test]
    fn test_rename_errors() {
        let mut wb = workbook();
        assert!(matches!(
            wb.rename_sheet("Nope", "C"),
            Err(Error::SheetNotFound(_))
        ));
        assert!(matches!(
            wb.rename_sheet("A", "B"),
            Err(Error::DuplicateSheetName(name)) if name == "B"
        ));
        // nothing changed
        assert_eq!(wb.sheet_names(), vec!["A", "B"]);
    }

    #[test]
    fn test_display() {
        assert_eq!(workbook().to_string(), "Workbook: Data, sheets: [A, B]");
    }
}
