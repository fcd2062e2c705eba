use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use userhub_core::AppError;

use crate::auth::{caller_context, secrets_match};
use crate::error::ApiResult;
use crate::state::AppState;

/// Header carrying the identity provider's shared claims secret.
pub const CLAIMS_SECRET_HEADER: &str = "x-claims-secret";

/// Resolves the bearer token into a `CallerContext` request extension.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::Unauthorized("bearer token required".to_owned()))?;
    let claims = state.token_verifier.verify(token)?;
    let context = caller_context(&claims)?;

    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

/// Admits identity-provider calls that present the shared claims secret.
pub async fn require_claims_secret(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let presented = request
        .headers()
        .get(CLAIMS_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !secrets_match(presented, &state.claims_shared_secret) {
        return Err(AppError::Unauthorized("invalid claims secret".to_owned()).into());
    }

    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}
