use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use userhub_core::AppError;

use crate::auth::secrets_match;
use crate::dto::{BootstrapRequest, BootstrapResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// Creates an institution with its root role and first administrator.
pub async fn bootstrap_handler(
    State(state): State<AppState>,
    Json(payload): Json<BootstrapRequest>,
) -> ApiResult<(StatusCode, Json<BootstrapResponse>)> {
    if !secrets_match(&payload.token, &state.bootstrap_token) {
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()).into());
    }

    let outcome = state
        .institution_service
        .bootstrap_institution(payload.institution.into(), payload.administrator.into())
        .await?;

    Ok((StatusCode::CREATED, Json(BootstrapResponse::from(outcome))))
}
