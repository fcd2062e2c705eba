use axum::Json;
use axum::extract::State;
use userhub_core::InstitutionId;
use userhub_domain::IdentityClaims;

use crate::dto::JwtClaimsRequest;
use crate::error::ApiResult;
use crate::state::AppState;

/// Issues identity claims for the identity provider.
pub async fn jwt_claims_handler(
    State(state): State<AppState>,
    Json(payload): Json<JwtClaimsRequest>,
) -> ApiResult<Json<IdentityClaims>> {
    let claims = state
        .claims_service
        .claims_for(
            payload.personal_identification_code.as_str(),
            payload.institution_id.map(InstitutionId::from_uuid),
        )
        .await?;

    Ok(Json(claims))
}
