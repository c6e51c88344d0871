//! # Workbook reader
//!
//! Reads Excel 2007+ workbooks (`.xlsx`, `.xlsm`, `.xlam`) straight from the
//! zip package: the workbook part for sheet order and the date system, the
//! styles part for date/time number formats, the shared string table, and
//! each worksheet part on demand. Cells come back as [`Table`]s whose header
//! is the first non-empty row.
//!
//! The reader is compiled in with the `xlsx` cargo feature. [`reader_capability`] tells
//! callers whether it is present before any file is touched.
#[cfg(feature = "xlsx")]
mod cell;
#[cfg(feature = "xlsx")]
mod excel;
#[cfg(feature = "xlsx")]
mod reference;
#[cfg(feature = "xlsx")]
mod sheet;
#[cfg(feature = "xlsx")]
mod xlsx;

use crate::error::CombineSheetsError;
use crate::table::Table;
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading a workbook.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Unsupported spreadsheet format: {0}")]
    UnsupportedFormatError(String),

    #[error("Invalid spreadsheet '{0}': {1}")]
    FormatError(String, String),

    #[error("Spreadsheet '{0}' is a compound document (password protected or legacy format)")]
    CompoundDocumentError(String),

    #[error("Spreadsheet '{0}' has no worksheets")]
    SpreadsheetEmptyError(String),

    #[error("Missing package part '{0}'")]
    FileError(String),

    #[error("Sheet '{1}' not found in '{0}'")]
    SheetNotFoundError(String, String),

    #[error("Sheet '{1}' in '{0}' is a {2}, not a worksheet")]
    NotWorksheetError(String, String, String),

    #[error("Sheet '{1}' in '{0}' has no relationship '{2}'")]
    RelationshipNotFoundError(String, String, String),

    #[error("Invalid cell value in '{0}', sheet '{1}', cell {2}: {3}")]
    CellValueError(String, String, String, String),
}

/// Whether the workbook reader is available in this build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Capability {
    Available,
    Unavailable { reason: String },
}

impl Capability {
    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available)
    }
}

/// Reports whether workbooks can be read.
pub fn reader_capability() -> Capability {
    if cfg!(feature = "xlsx") {
        Capability::Available
    } else {
        Capability::Unavailable {
            reason: "this build has no workbook reader; rebuild with `--features xlsx` to read .xlsx files".to_owned(),
        }
    }
}

/// An open workbook.
pub(crate) trait Spreadsheet {
    /// Path the workbook was opened from
    fn name(&self) -> String;

    /// Worksheet names in declaration order
    fn sheet_names(&self) -> Vec<String>;

    /// Reads one worksheet into a table.
    fn read_sheet(&mut self, name: &str) -> Result<Table, CombineSheetsError>;
}

/// Opens a workbook, choosing the reader from the file extension.
pub(crate) fn open_spreadsheet(path: &Path) -> Result<Box<dyn Spreadsheet>, CombineSheetsError> {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match extension.as_str() {
        #[cfg(feature = "xlsx")]
        "xlsx" | "xlsm" | "xlam" => Ok(Box::new(xlsx::XlsxSpreadsheet::open(path)?)),
        _ => Err(SpreadsheetError::UnsupportedFormatError(path.display().to_string()))?,
    }
}
