//! Prelude module - common imports for tabula users
//!
//! ```rust
//! use tabula::prelude::*;
//! ```

pub use crate::{
    // Main types
    CellValue,
    // Error types
    Error,
    // Options
    FileImport,
    // Bibliography types
    ImportWarning,
    RangeSpec,
    Reporter,
    Result,
    Sheet,
    Table,
    Workbook,
    // Extension traits
    WorkbookExt,
};
