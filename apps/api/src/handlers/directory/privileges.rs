use super::*;

pub async fn list_privileges_handler(
    State(state): State<AppState>,
    Extension(context): Extension<CallerContext>,
) -> ApiResult<Json<Vec<PrivilegeResponse>>> {
    let privileges = state
        .privilege_service
        .list(&context)?
        .into_iter()
        .map(PrivilegeResponse::from)
        .collect();

    Ok(Json(privileges))
}
