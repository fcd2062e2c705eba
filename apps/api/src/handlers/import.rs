use axum::Json;
use axum::body::Bytes;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use userhub_application::ImportOutcome;
use userhub_domain::CallerContext;

use crate::dto::{
    FileValidationResponse, ImportInterruptedResponse, ImportRejectedResponse, ImportResponse,
    RowErrorsResponse, ValidateRowRequest, ValidateRowResponse,
};
use crate::error::{ApiResult, status_for};
use crate::state::AppState;

/// Validates a whole `;`-delimited file. Content errors answer 422 with the failing rows.
pub async fn validate_file_handler(
    State(state): State<AppState>,
    Extension(context): Extension<CallerContext>,
    body: Bytes,
) -> ApiResult<Response> {
    let validation = state
        .user_import_service
        .validate_file(&context, &body)
        .await?;

    let status = if validation.invalid_rows.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };

    Ok((status, Json(FileValidationResponse::from(validation))).into_response())
}

/// Validates one row's attribute values against the caller's institution.
pub async fn validate_row_handler(
    State(state): State<AppState>,
    Extension(context): Extension<CallerContext>,
    Json(payload): Json<ValidateRowRequest>,
) -> ApiResult<Response> {
    let errors = state
        .user_import_service
        .validate_row(&context, &payload.attributes)
        .await?;

    let status = if errors.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };

    Ok((status, Json(ValidateRowResponse::from(errors))).into_response())
}

/// Imports a whole file. Answers 422 without writing when any row is invalid.
pub async fn import_handler(
    State(state): State<AppState>,
    Extension(context): Extension<CallerContext>,
    body: Bytes,
) -> ApiResult<Response> {
    let outcome = state
        .user_import_service
        .import_file(&context, &body)
        .await?;

    let response = match outcome {
        ImportOutcome::Completed { imported } => {
            (StatusCode::OK, Json(ImportResponse { imported })).into_response()
        }
        ImportOutcome::Rejected { invalid_rows } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ImportRejectedResponse {
                message: "file contains invalid rows".to_owned(),
                invalid_rows: invalid_rows
                    .into_iter()
                    .map(RowErrorsResponse::from)
                    .collect(),
            }),
        )
            .into_response(),
        ImportOutcome::Interrupted {
            imported,
            row,
            error,
        } => (
            status_for(&error),
            Json(ImportInterruptedResponse {
                message: error.to_string(),
                row,
                imported,
            }),
        )
            .into_response(),
    };

    Ok(response)
}
