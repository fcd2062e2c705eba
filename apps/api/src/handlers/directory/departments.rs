use super::*;

pub async fn list_departments_handler(
    State(state): State<AppState>,
    Extension(context): Extension<CallerContext>,
) -> ApiResult<Json<Vec<DepartmentResponse>>> {
    let departments = state
        .department_service
        .list(&context)
        .await?
        .into_iter()
        .map(DepartmentResponse::from)
        .collect();

    Ok(Json(departments))
}

pub async fn get_department_handler(
    State(state): State<AppState>,
    Extension(context): Extension<CallerContext>,
    Path(department_id): Path<Uuid>,
) -> ApiResult<Json<DepartmentResponse>> {
    let department = state
        .department_service
        .get(&context, DepartmentId::from_uuid(department_id))
        .await?;

    Ok(Json(DepartmentResponse::from(department)))
}

pub async fn create_department_handler(
    State(state): State<AppState>,
    Extension(context): Extension<CallerContext>,
    Json(payload): Json<DepartmentRequest>,
) -> ApiResult<(StatusCode, Json<DepartmentResponse>)> {
    let department = state
        .department_service
        .create(&context, payload.name.as_str())
        .await?;

    Ok((StatusCode::CREATED, Json(DepartmentResponse::from(department))))
}

pub async fn update_department_handler(
    State(state): State<AppState>,
    Extension(context): Extension<CallerContext>,
    Path(department_id): Path<Uuid>,
    Json(payload): Json<DepartmentRequest>,
) -> ApiResult<Json<DepartmentResponse>> {
    let department = state
        .department_service
        .update(
            &context,
            DepartmentId::from_uuid(department_id),
            payload.name.as_str(),
        )
        .await?;

    Ok(Json(DepartmentResponse::from(department)))
}

pub async fn delete_department_handler(
    State(state): State<AppState>,
    Extension(context): Extension<CallerContext>,
    Path(department_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .department_service
        .delete(&context, DepartmentId::from_uuid(department_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
