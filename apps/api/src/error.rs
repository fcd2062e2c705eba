use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use userhub_core::AppError;

mod types;

pub use types::ErrorResponse;

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

/// Maps an application error category to its HTTP status.
pub fn status_for(error: &AppError) -> StatusCode {
    match error {
        AppError::Validation(_) | AppError::Denied(_) => StatusCode::BAD_REQUEST,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Conflict(_) => StatusCode::CONFLICT,
        AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
        }

        let payload = Json(ErrorResponse::new(self.0.to_string()));
        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use userhub_core::{AppError, Denial};

    use super::status_for;

    #[test]
    fn denials_are_client_errors() {
        assert_eq!(
            status_for(&AppError::Denied(Denial::OnlyUserUnderRootRole)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&AppError::Validation("bad".to_owned())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn foreign_and_missing_entities_share_not_found() {
        assert_eq!(
            status_for(&AppError::NotFound("role".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&AppError::Forbidden("EDIT_ROLE".to_owned())),
            StatusCode::FORBIDDEN
        );
    }
}
