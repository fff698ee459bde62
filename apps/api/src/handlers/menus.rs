use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use tenura_core::{MenuId, UserIdentity};

use crate::dto::{MenuResponse, SaveMenuRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_menus_handler(State(state): State<AppState>) -> ApiResult<Json<Vec<MenuResponse>>> {
    let menus = state
        .menu_service
        .list_menus()
        .await?
        .into_iter()
        .map(MenuResponse::from)
        .collect();

    Ok(Json(menus))
}

pub async fn create_menu_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<SaveMenuRequest>,
) -> ApiResult<(StatusCode, Json<MenuResponse>)> {
    let menu = state.menu_service.create_menu(&user, payload.into()).await?;
    Ok((StatusCode::CREATED, Json(MenuResponse::from(menu))))
}

pub async fn update_menu_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(menu_id): Path<MenuId>,
    Json(payload): Json<SaveMenuRequest>,
) -> ApiResult<Json<MenuResponse>> {
    let menu = state
        .menu_service
        .update_menu(&user, menu_id, payload.into())
        .await?;

    Ok(Json(MenuResponse::from(menu)))
}

pub async fn delete_menu_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(menu_id): Path<MenuId>,
) -> ApiResult<StatusCode> {
    state.menu_service.delete_menu(&user, menu_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
