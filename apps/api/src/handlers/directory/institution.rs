use super::*;

pub async fn current_institution_handler(
    State(state): State<AppState>,
    Extension(context): Extension<CallerContext>,
) -> ApiResult<Json<InstitutionResponse>> {
    let institution = state
        .institution_service
        .current_institution(&context)
        .await?;

    Ok(Json(InstitutionResponse::from(institution)))
}

pub async fn update_institution_handler(
    State(state): State<AppState>,
    Extension(context): Extension<CallerContext>,
    Json(payload): Json<InstitutionRequest>,
) -> ApiResult<Json<InstitutionResponse>> {
    let institution = state
        .institution_service
        .update_institution(&context, payload.into())
        .await?;

    Ok(Json(InstitutionResponse::from(institution)))
}
