use thiserror::Error;
use userhub_core::AppError;

/// Structural and configuration failures of the CSV pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    /// The validator was configured without attributes or rules.
    #[error("invalid import configuration: {0}")]
    Configuration(String),
    /// The source cannot be parsed as delimited text.
    #[error("file is not a readable CSV file: {0}")]
    Format(String),
    /// The header row differs from the expected one.
    #[error("unexpected header row '{}', expected '{}'", actual.join(";"), expected.join(";"))]
    HeaderMismatch {
        /// Expected header cells.
        expected: Vec<String>,
        /// Header cells found in the file.
        actual: Vec<String>,
    },
    /// A data row has a different number of cells than configured attributes.
    #[error("row {row} has {actual} columns, expected {expected}")]
    ColumnCount {
        /// One-based data row number.
        row: usize,
        /// Configured attribute count.
        expected: usize,
        /// Cells found in the row.
        actual: usize,
    },
}

impl From<ImportError> for AppError {
    fn from(value: ImportError) -> Self {
        Self::Validation(value.to_string())
    }
}
