//! # tabula-core
//!
//! Core data structures for the tabula workbook library.
//!
//! This crate provides the fundamental types used throughout tabula:
//! - [`CellValue`] - A single typed value in a table
//! - [`Table`] - Ordered columns over rows of values
//! - [`Sheet`] - A named table plus normalization helpers
//! - [`Workbook`] - A named collection of uniquely-named sheets
//! - [`RangeSpec`] - Printer-style sheet selection ("1-3,5")
//!
//! ## Example
//!
//! ```rust
//! use tabula_core::{CellValue, RangeSpec, Table, Workbook};
//!
//! let mut table = Table::new(["Title", "Year"]);
//! table.push_row(vec!["Caf\\'e".into(), "2021".into()]).unwrap();
//!
//! let mut workbook = Workbook::new("papers");
//! let sheet = workbook.add_sheet("refs", table);
//! sheet.decode_latex_escapes(None);
//! sheet.coerce_column_types();
//!
//! let sheet = workbook.sheet("refs").unwrap();
//! assert_eq!(sheet.table().get(0, "Title"), Some(&CellValue::string("Café")));
//! assert_eq!(sheet.table().get(0, "Year"), Some(&CellValue::Integer(2021)));
//!
//! let spec: RangeSpec = "1-3,5".parse().unwrap();
//! assert_eq!(spec.to_vec(), vec![0, 1, 2, 4]);
//! ```

pub mod error;
pub mod latex;
pub mod range;
pub mod sheet;
pub mod table;
pub mod value;
pub mod workbook;

// Re-exports for convenience
pub use error::{Error, Result};
pub use latex::decode_latex;
pub use range::RangeSpec;
pub use sheet::Sheet;
pub use table::Table;
pub use value::CellValue;
pub use workbook::Workbook;
