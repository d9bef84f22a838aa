//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::options::CsvReadOptions;
use tabula_core::{CellValue, Table};

/// Field values read as missing
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-NaN", "-nan", "<NA>", "N/A", "NA", "NULL", "NaN", "None",
    "n/a", "nan", "null",
];

/// Type shared by every non-missing value of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Boolean,
    Integer,
    Number,
    Text,
}

/// Delimited text file reader
pub struct CsvReader;

impl CsvReader {
    /// Read a delimited file into a table
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<Table> {
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read delimited text from a reader into a table.
    ///
    /// Short records are padded with empty cells; a record with more fields
    /// than the header is an error. With `auto_detect_types`, each column gets
    /// the narrowest type that fits all its values (boolean, integer, number,
    /// then text).
    pub fn read<R: Read>(reader: R, options: &CsvReadOptions) -> CsvResult<Table> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(options.has_header)
            .flexible(true)
            .from_reader(reader);

        let header: Option<Vec<String>> = if options.has_header {
            Some(csv_reader.headers()?.iter().map(String::from).collect())
        } else {
            None
        };

        let mut records: Vec<Vec<String>> = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            if let Some(columns) = &header {
                if record.len() > columns.len() {
                    let row = record
                        .position()
                        .map_or(records.len() + 2, |p| p.line() as usize);
                    return Err(CsvError::Parse {
                        row,
                        column: columns.len() + 1,
                        message: format!(
                            "expected {} fields, found {}",
                            columns.len(),
                            record.len()
                        ),
                    });
                }
            }
            records.push(record.iter().map(String::from).collect());
        }

        let columns = header.unwrap_or_else(|| {
            let width = records.iter().map(Vec::len).max().unwrap_or(0);
            (0..width).map(|i| i.to_string()).collect()
        });

        let kinds: Vec<ColumnKind> = (0..columns.len())
            .map(|col| {
                if options.auto_detect_types {
                    infer_column(records.iter().filter_map(|r| r.get(col).map(String::as_str)))
                } else {
                    ColumnKind::Text
                }
            })
            .collect();

        let rows = records
            .into_iter()
            .map(|record| {
                record
                    .iter()
                    .zip(&kinds)
                    .map(|(field, kind)| convert(field, *kind))
                    .collect()
            })
            .collect();

        Ok(Table::from_rows(columns, rows)?)
    }
}

fn is_missing(field: &str) -> bool {
    NA_VALUES.contains(&field.trim())
}

fn parse_bool(field: &str) -> Option<bool> {
    match field.trim() {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

fn parse_number(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Detect the narrowest type fitting all non-missing values
fn infer_column<'a, I: Iterator<Item = &'a str>>(values: I) -> ColumnKind {
    let mut kind: Option<ColumnKind> = None;

    for field in values.filter(|f| !is_missing(f)) {
        let field_kind = if parse_bool(field).is_some() {
            ColumnKind::Boolean
        } else if field.trim().parse::<i64>().is_ok() {
            ColumnKind::Integer
        } else if parse_number(field).is_some() {
            ColumnKind::Number
        } else {
            return ColumnKind::Text;
        };

        kind = Some(match (kind, field_kind) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(ColumnKind::Integer), ColumnKind::Number)
            | (Some(ColumnKind::Number), ColumnKind::Integer) => ColumnKind::Number,
            _ => return ColumnKind::Text,
        });
    }

    kind.unwrap_or(ColumnKind::Text)
}

fn convert(field: &str, kind: ColumnKind) -> CellValue {
    if field.is_empty() || (kind != ColumnKind::Text && is_missing(field)) {
        return CellValue::Empty;
    }

    let converted = match kind {
        ColumnKind::Boolean => parse_bool(field).map(CellValue::Boolean),
        ColumnKind::Integer => field.trim().parse::<i64>().ok().map(CellValue::Integer),
        ColumnKind::Number => parse_number(field).map(CellValue::Number),
        ColumnKind::Text => None,
    };

    converted.unwrap_or_else(|| {
        if is_missing(field) {
            CellValue::Empty
        } else {
            CellValue::string(field)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn read(text: &str, options: &CsvReadOptions) -> Table {
        CsvReader::read(Cursor::new(text), options).unwrap()
    }

    #[test]
    fn test_read_with_header_and_types() {
        let table = read(
            "name,qty,price,ok\napple,3,1.5,true\npear,,2,FALSE\n",
            &CsvReadOptions::default(),
        );

        assert_eq!(table.columns(), &["name", "qty", "price", "ok"]);
        assert_eq!(
            table.row(0).unwrap(),
            &[
                CellValue::string("apple"),
                CellValue::Integer(3),
                CellValue::Number(1.5),
                CellValue::Boolean(true)
            ]
        );
        assert_eq!(
            table.row(1).unwrap(),
            &[
                CellValue::string("pear"),
                CellValue::Empty,
                CellValue::Number(2.0),
                CellValue::Boolean(false)
            ]
        );
    }

    #[test]
    fn test_mixed_column_stays_text() {
        let table = read("code\n1\nA7\nNA\n", &CsvReadOptions::default());
        let codes: Vec<CellValue> = table.column("code").unwrap().cloned().collect();
        assert_eq!(
            codes,
            vec![CellValue::string("1"), CellValue::string("A7"), CellValue::Empty]
        );
    }

    #[test]
    fn test_custom_delimiter() {
        let table = read("a;b\n1;x\n", &CsvReadOptions::default().with_delimiter(b';'));
        assert_eq!(table.columns(), &["a", "b"]);
        assert_eq!(table.get(0, "b"), Some(&CellValue::string("x")));
    }

    #[test]
    fn test_tsv_options() {
        let table = read("a\tb,c\n1\t2,3\n", &CsvReadOptions::tsv());
        assert_eq!(table.columns(), &["a", "b,c"]);
        assert_eq!(table.get(0, "b,c"), Some(&CellValue::string("2,3")));
    }

    #[test]
    fn test_short_records_padded() {
        let table = read("a,b,c\n1\n", &CsvReadOptions::default());
        assert_eq!(table.get(0, "c"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_long_record_is_error() {
        let err = CsvReader::read(Cursor::new("a,b\n1,2,3\n"), &CsvReadOptions::default())
            .unwrap_err();
        assert!(matches!(err, CsvError::Parse { row: 2, .. }), "{:?}", err);
    }

    #[test]
    fn test_no_header() {
        let options = CsvReadOptions {
            has_header: false,
            ..CsvReadOptions::default()
        };
        let table = read("x,1\ny,2,extra\n", &options);
        assert_eq!(table.columns(), &["0", "1", "2"]);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_duplicate_headers_disambiguated() {
        let table = read("a,a,\n1,2,3\n", &CsvReadOptions::default());
        assert_eq!(table.columns(), &["a", "a.1", "Unnamed: 2"]);
    }

    #[test]
    fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "x\n1\n2\n").unwrap();

        let table = CsvReader::read_file(&path, &CsvReadOptions::default()).unwrap();
        assert_eq!(table.row_count(), 2);
    }
}
