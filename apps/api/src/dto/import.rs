use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use userhub_application::FileValidation;
use userhub_application::csv_import::{FieldErrors, RowRecord};

/// Attribute values of one import row, keyed like the file columns map them.
#[derive(Debug, Deserialize)]
pub struct ValidateRowRequest {
    /// Values by attribute name.
    pub attributes: BTreeMap<String, String>,
}

/// Rule failures of a single row.
#[derive(Debug, Serialize)]
pub struct ValidateRowResponse {
    /// Whether every rule passed.
    pub valid: bool,
    /// Failure messages by attribute name.
    pub errors: FieldErrors,
}

/// One row with its rule failures.
#[derive(Debug, Serialize)]
pub struct RowErrorsResponse {
    /// One-based data row number, header excluded.
    pub row: usize,
    /// Values read from the row.
    pub attributes: BTreeMap<String, String>,
    /// Failure messages by attribute name.
    pub errors: FieldErrors,
}

/// Outcome of validating a whole file.
#[derive(Debug, Serialize)]
pub struct FileValidationResponse {
    /// Number of data rows read.
    pub rows: usize,
    /// Rows with rule failures, in file order.
    pub invalid_rows: Vec<RowErrorsResponse>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    /// Number of committed rows.
    pub imported: usize,
}

/// Returned with 422 when validation found content errors and nothing was written.
#[derive(Debug, Serialize)]
pub struct ImportRejectedResponse {
    /// Summary of the rejection.
    pub message: String,
    /// Rows with rule failures, in file order.
    pub invalid_rows: Vec<RowErrorsResponse>,
}

/// Returned when a row failed while committing. Earlier rows stay committed.
#[derive(Debug, Serialize)]
pub struct ImportInterruptedResponse {
    /// Failure of the row transaction.
    pub message: String,
    /// One-based number of the failed row.
    pub row: usize,
    /// Number of rows committed before the failure.
    pub imported: usize,
}

impl From<RowRecord> for RowErrorsResponse {
    fn from(value: RowRecord) -> Self {
        Self {
            row: value.row,
            attributes: value.attributes,
            errors: value.errors,
        }
    }
}

impl From<FileValidation> for FileValidationResponse {
    fn from(value: FileValidation) -> Self {
        Self {
            rows: value.rows,
            invalid_rows: value
                .invalid_rows
                .into_iter()
                .map(RowErrorsResponse::from)
                .collect(),
        }
    }
}

impl From<FieldErrors> for ValidateRowResponse {
    fn from(errors: FieldErrors) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}
