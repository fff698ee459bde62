use super::*;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .security_admin_service
        .list_roles(&user)
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<RoleId>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state.security_admin_service.get_role(&user, role_id).await?;
    Ok(Json(RoleResponse::from(role)))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let role = state
        .security_admin_service
        .create_role(&user, payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<RoleId>,
    Json(payload): Json<UpdateRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .security_admin_service
        .update_role(&user, role_id, payload.into())
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn list_role_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<RoleId>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .security_admin_service
        .list_role_permissions(&user, role_id)
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn assign_role_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<RoleId>,
    Json(payload): Json<AssignRolePermissionsRequest>,
) -> ApiResult<StatusCode> {
    state
        .security_admin_service
        .assign_role_permissions(&user, role_id, payload.permission_ids)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_role_menus_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<RoleId>,
) -> ApiResult<Json<Vec<RoleMenuResponse>>> {
    let menus = state
        .security_admin_service
        .list_role_menus(&user, role_id)
        .await?
        .into_iter()
        .map(RoleMenuResponse::from)
        .collect();

    Ok(Json(menus))
}

pub async fn assign_role_menus_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<RoleId>,
    Json(payload): Json<AssignRoleMenusRequest>,
) -> ApiResult<StatusCode> {
    let grants = payload.into_grants()?;
    state
        .security_admin_service
        .assign_role_menus(&user, role_id, grants)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
