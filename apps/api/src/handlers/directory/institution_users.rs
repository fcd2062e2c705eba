use super::*;

pub async fn list_institution_users_handler(
    State(state): State<AppState>,
    Extension(context): Extension<CallerContext>,
) -> ApiResult<Json<Vec<InstitutionUserResponse>>> {
    let institution_users = state
        .institution_user_service
        .list(&context)
        .await?
        .into_iter()
        .map(InstitutionUserResponse::from)
        .collect();

    Ok(Json(institution_users))
}

pub async fn get_institution_user_handler(
    State(state): State<AppState>,
    Extension(context): Extension<CallerContext>,
    Path(institution_user_id): Path<Uuid>,
) -> ApiResult<Json<InstitutionUserResponse>> {
    let institution_user = state
        .institution_user_service
        .get(&context, InstitutionUserId::from_uuid(institution_user_id))
        .await?;

    Ok(Json(InstitutionUserResponse::from(institution_user)))
}

pub async fn create_institution_user_handler(
    State(state): State<AppState>,
    Extension(context): Extension<CallerContext>,
    Json(payload): Json<CreateInstitutionUserRequest>,
) -> ApiResult<(StatusCode, Json<InstitutionUserResponse>)> {
    let institution_user = state
        .institution_user_service
        .create(&context, payload.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(InstitutionUserResponse::from(institution_user)),
    ))
}

pub async fn update_institution_user_handler(
    State(state): State<AppState>,
    Extension(context): Extension<CallerContext>,
    Path(institution_user_id): Path<Uuid>,
    Json(payload): Json<UpdateInstitutionUserRequest>,
) -> ApiResult<Json<InstitutionUserResponse>> {
    let institution_user = state
        .institution_user_service
        .update(
            &context,
            InstitutionUserId::from_uuid(institution_user_id),
            payload.into(),
        )
        .await?;

    Ok(Json(InstitutionUserResponse::from(institution_user)))
}

pub async fn deactivate_institution_user_handler(
    State(state): State<AppState>,
    Extension(context): Extension<CallerContext>,
    Path(institution_user_id): Path<Uuid>,
    Json(payload): Json<DeactivateInstitutionUserRequest>,
) -> ApiResult<Json<InstitutionUserResponse>> {
    let institution_user = state
        .institution_user_service
        .deactivate(
            &context,
            InstitutionUserId::from_uuid(institution_user_id),
            payload.deactivation_date,
        )
        .await?;

    Ok(Json(InstitutionUserResponse::from(institution_user)))
}

pub async fn activate_institution_user_handler(
    State(state): State<AppState>,
    Extension(context): Extension<CallerContext>,
    Path(institution_user_id): Path<Uuid>,
) -> ApiResult<Json<InstitutionUserResponse>> {
    let institution_user = state
        .institution_user_service
        .activate(&context, InstitutionUserId::from_uuid(institution_user_id))
        .await?;

    Ok(Json(InstitutionUserResponse::from(institution_user)))
}

pub async fn archive_institution_user_handler(
    State(state): State<AppState>,
    Extension(context): Extension<CallerContext>,
    Path(institution_user_id): Path<Uuid>,
) -> ApiResult<Json<InstitutionUserResponse>> {
    let institution_user = state
        .institution_user_service
        .archive(&context, InstitutionUserId::from_uuid(institution_user_id))
        .await?;

    Ok(Json(InstitutionUserResponse::from(institution_user)))
}
