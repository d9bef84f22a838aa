//! # tabula-xlsx
//!
//! XLSX (Office Open XML) reader and writer for tabula.
//!
//! Every worksheet maps to one [`Sheet`](tabula_core::Sheet): the first
//! non-empty row is the header, the rest are data rows. Cell formatting is
//! neither read nor preserved; the writer emits a bold header row.

pub mod error;
pub mod reader;
pub mod writer;

mod address;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::{XlsxWriter, MAX_SHEET_NAME_LEN};
