use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use tenura_core::{UserId, UserIdentity};

use crate::dto::{CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state
        .user_service
        .list_users(&user)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(users))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<UserId>,
) -> ApiResult<Json<UserResponse>> {
    let record = state.user_service.get_user(&user, user_id).await?;
    Ok(Json(UserResponse::from(record)))
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let record = state
        .user_service
        .create_user(&user, payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(record))))
}

pub async fn update_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<UserId>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let input = payload.into_input(user.institution_id())?;
    let record = state.user_service.update_user(&user, user_id, input).await?;

    Ok(Json(UserResponse::from(record)))
}

pub async fn delete_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<UserId>,
) -> ApiResult<StatusCode> {
    state.user_service.delete_user(&user, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
