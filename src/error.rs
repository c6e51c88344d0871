use thiserror::Error;

/// Main error type for the combine_sheets crate.
/// Aggregates errors from the standard library, the workbook reader dependencies and internal modules.
#[derive(Error, Debug)]
pub enum CombineSheetsError {
    #[error("{0}")]
    WithContextError(String),

    /// The spreadsheet reading capability is not compiled into this build.
    #[error("Spreadsheet reader unavailable: {reason}")]
    CapabilityUnavailable { reason: String },

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("{0}")]
    StringEncodingError(#[from] std::str::Utf8Error),

    // Third-party library errors
    #[cfg(feature = "xlsx")]
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[cfg(feature = "xlsx")]
    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[cfg(feature = "xlsx")]
    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[cfg(feature = "xlsx")]
    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    #[error("{0}")]
    PolarsError(#[from] polars::prelude::PolarsError),

    // Helper module errors
    #[cfg(feature = "xlsx")]
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Spreadsheet and table module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    #[error("{0}")]
    TableError(#[from] crate::table::TableError),
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, CombineSheetsError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| CombineSheetsError::WithContextError(format!("{}: {}", message, e)))
    }
}
