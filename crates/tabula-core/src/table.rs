//! Table type - ordered columns over rows of cell values

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::value::CellValue;

/// A rectangular table: an ordered set of column names and rows of values.
///
/// Every row holds exactly one value per column. Column names are unique;
/// [`Table::new`] disambiguates blank and repeated names the way spreadsheet
/// readers do (`Unnamed: 2`, `Title.1`).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create an empty table with the given columns
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: unique_column_names(columns.into_iter().map(Into::into)),
            rows: Vec::new(),
        }
    }

    /// Create a table from columns and rows, padding short rows with [`CellValue::Empty`]
    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<CellValue>>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(columns);
        table.rows.reserve(rows.len());
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Check if a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Get a row by index
    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Iterate over all rows
    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Iterate over the values of one column
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &CellValue>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[index]))
    }

    /// Get a value by row index and column name
    pub fn get(&self, row: usize, column: &str) -> Option<&CellValue> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[index])
    }

    /// Set a value by row index and column name
    pub fn set<V: Into<CellValue>>(&mut self, row: usize, column: &str, value: V) -> Result<()> {
        let index = self
            .column_index(column)
            .ok_or_else(|| Error::ColumnNotFound(column.into()))?;
        let row_count = self.rows.len();
        let cells = self
            .rows
            .get_mut(row)
            .ok_or_else(|| Error::other(format!("Row {} out of bounds (count: {})", row, row_count)))?;
        cells[index] = value.into();
        Ok(())
    }

    /// Append a row
    pub fn push_row(&mut self, row: Vec<CellValue>) -> Result<()> {
        let row = self.fit_row(self.rows.len(), row)?;
        self.rows.push(row);
        Ok(())
    }

    /// Insert a row at `index`; an index past the end appends
    pub fn insert_row(&mut self, index: usize, row: Vec<CellValue>) -> Result<()> {
        let index = index.min(self.rows.len());
        let row = self.fit_row(index, row)?;
        self.rows.insert(index, row);
        Ok(())
    }

    /// Insert a row built from `(column, value)` pairs at `index` (clamped).
    ///
    /// Columns without a value are empty; unknown column names are ignored.
    pub fn insert_record<I, K, V>(&mut self, index: usize, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<CellValue>,
    {
        let mut row = vec![CellValue::Empty; self.columns.len()];
        for (key, value) in values {
            if let Some(position) = self.column_index(key.as_ref()) {
                row[position] = value.into();
            }
        }
        let index = index.min(self.rows.len());
        self.rows.insert(index, row);
    }

    /// Add a column, or replace the values of an existing one.
    ///
    /// Missing trailing values are filled with [`CellValue::Empty`]; extra
    /// values are dropped.
    pub fn set_column<S: Into<String>>(&mut self, name: S, values: Vec<CellValue>) {
        let name = name.into();
        let index = match self.column_index(&name) {
            Some(index) => index,
            None => {
                self.columns.push(name);
                for row in &mut self.rows {
                    row.push(CellValue::Empty);
                }
                self.columns.len() - 1
            }
        };

        let mut values = values.into_iter();
        for row in &mut self.rows {
            row[index] = values.next().unwrap_or_default();
        }
    }

    /// Replace every value of a column in place. Returns false if the column is absent.
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> bool
    where
        F: FnMut(&CellValue) -> CellValue,
    {
        let Some(index) = self.column_index(name) else {
            return false;
        };
        for row in &mut self.rows {
            row[index] = f(&row[index]);
        }
        true
    }

    /// Convert a column to nullable integers; non-numeric values become empty.
    /// Returns false if the column is absent.
    pub fn coerce_integer(&mut self, name: &str) -> bool {
        self.map_column(name, |value| {
            value
                .to_integer()
                .map_or(CellValue::Empty, CellValue::Integer)
        })
    }

    /// A new table with only the given columns, in the given order
    pub fn select(&self, columns: &[&str]) -> Result<Table> {
        let indices = columns
            .iter()
            .map(|name| {
                self.column_index(name)
                    .ok_or_else(|| Error::ColumnNotFound((*name).into()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Table {
            columns: indices.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        })
    }

    /// A new table with the rows of `other` appended.
    ///
    /// The result has the union of both column sets (this table's first);
    /// cells for columns a side does not have are empty.
    pub fn concat(&self, other: &Table) -> Table {
        let mut columns = self.columns.clone();
        for name in &other.columns {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }

        let mut rows = Vec::with_capacity(self.rows.len() + other.rows.len());
        for source in [self, other] {
            let positions: Vec<Option<usize>> =
                columns.iter().map(|c| source.column_index(c)).collect();
            for row in &source.rows {
                rows.push(
                    positions
                        .iter()
                        .map(|p| p.map(|i| row[i].clone()).unwrap_or_default())
                        .collect(),
                );
            }
        }

        Table { columns, rows }
    }

    fn fit_row(&self, position: usize, mut row: Vec<CellValue>) -> Result<Vec<CellValue>> {
        if row.len() > self.columns.len() {
            return Err(Error::RowTooWide {
                row: position,
                width: row.len(),
                columns: self.columns.len(),
            });
        }
        row.resize(self.columns.len(), CellValue::Empty);
        Ok(row)
    }
}

/// Make header names unique: blank names become `Unnamed: <position>` and
/// repeats get a `.1`, `.2`, ... suffix.
fn unique_column_names<I: Iterator<Item = String>>(names: I) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for (position, name) in names.enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {}", position)
        } else {
            name
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}.{}", base, suffix);
            suffix += 1;
        }

        seen.insert(candidate.clone());
        out.push(candidate);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Table {
        Table::from_rows(
            ["name", "qty"],
            vec![
                vec!["apple".into(), 3.into()],
                vec!["pear".into(), 5.into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_unique_column_names() {
        let table = Table::new(["a", "", "a", "b", "a"]);
        assert_eq!(table.columns(), &["a", "Unnamed: 1", "a.1", "b", "a.2"]);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let mut table = Table::new(["a", "b", "c"]);
        table.push_row(vec![1.into()]).unwrap();
        assert_eq!(
            table.row(0).unwrap(),
            &[CellValue::Integer(1), CellValue::Empty, CellValue::Empty]
        );
    }

    #[test]
    fn test_wide_rows_are_rejected() {
        let mut table = Table::new(["a"]);
        let err = table.push_row(vec![1.into(), 2.into()]).unwrap_err();
        assert!(matches!(err, Error::RowTooWide { width: 2, columns: 1, .. }));
    }

    #[test]
    fn test_insert_row_clamps_index() {
        let mut table = sample();
        table.insert_row(0, vec!["fig".into(), 1.into()]).unwrap();
        table.insert_row(99, vec!["kiwi".into()]).unwrap();

        let names: Vec<String> = table.column("name").unwrap().map(|v| v.to_string()).collect();
        assert_eq!(names, vec!["fig", "apple", "pear", "kiwi"]);
    }

    #[test]
    fn test_insert_record_by_column_name() {
        let mut table = sample();
        table.insert_record(1, [("qty", CellValue::Integer(9)), ("color", "red".into())]);
        table.insert_record(99, [("name", "plum")]);

        assert_eq!(table.row_count(), 4);
        assert_eq!(table.row(1).unwrap(), &[CellValue::Empty, CellValue::Integer(9)]);
        assert_eq!(table.get(3, "name"), Some(&CellValue::string("plum")));
        assert_eq!(table.get(3, "qty"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_select() {
        let table = sample();
        let selected = table.select(&["qty"]).unwrap();
        assert_eq!(selected.columns(), &["qty"]);
        assert_eq!(selected.get(1, "qty"), Some(&CellValue::Integer(5)));

        assert!(matches!(
            table.select(&["missing"]),
            Err(Error::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_concat_unions_columns() {
        let left = sample();
        let right = Table::from_rows(["qty", "color"], vec![vec![9.into(), "red".into()]]).unwrap();

        let joined = left.concat(&right);
        assert_eq!(joined.columns(), &["name", "qty", "color"]);
        assert_eq!(joined.row_count(), 3);
        assert_eq!(
            joined.row(2).unwrap(),
            &[CellValue::Empty, CellValue::Integer(9), CellValue::string("red")]
        );
        assert_eq!(joined.get(0, "color"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_coerce_integer() {
        let mut table = Table::from_rows(
            ["Year"],
            vec![vec!["2020".into()], vec!["n.d.".into()], vec![CellValue::Empty]],
        )
        .unwrap();

        assert!(table.coerce_integer("Year"));
        assert!(!table.coerce_integer("Missing"));

        let years: Vec<CellValue> = table.column("Year").unwrap().cloned().collect();
        assert_eq!(
            years,
            vec![CellValue::Integer(2020), CellValue::Empty, CellValue::Empty]
        );
    }

    #[test]
    fn test_set_column_adds_and_replaces() {
        let mut table = sample();
        table.set_column("flag", vec![true.into()]);
        assert_eq!(table.columns(), &["name", "qty", "flag"]);
        assert_eq!(table.get(1, "flag"), Some(&CellValue::Empty));

        table.set_column("qty", vec![0.into(), 0.into()]);
        assert_eq!(table.get(0, "qty"), Some(&CellValue::Integer(0)));
        assert_eq!(table.column_count(), 3);
    }
}
