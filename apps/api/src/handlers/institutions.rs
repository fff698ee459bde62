use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use tenura_core::{InstitutionId, UserIdentity};

use crate::dto::{InstitutionResponse, SaveInstitutionRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_institutions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<InstitutionResponse>>> {
    let institutions = state
        .institution_service
        .list_institutions(&user)
        .await?
        .into_iter()
        .map(InstitutionResponse::from)
        .collect();

    Ok(Json(institutions))
}

pub async fn get_institution_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(institution_id): Path<InstitutionId>,
) -> ApiResult<Json<InstitutionResponse>> {
    let institution = state
        .institution_service
        .get_institution(&user, institution_id)
        .await?;

    Ok(Json(InstitutionResponse::from(institution)))
}

pub async fn create_institution_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<SaveInstitutionRequest>,
) -> ApiResult<(StatusCode, Json<InstitutionResponse>)> {
    let institution = state
        .institution_service
        .create_institution(&user, payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(InstitutionResponse::from(institution))))
}

pub async fn update_institution_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(institution_id): Path<InstitutionId>,
    Json(payload): Json<SaveInstitutionRequest>,
) -> ApiResult<Json<InstitutionResponse>> {
    let institution = state
        .institution_service
        .update_institution(&user, institution_id, payload.into())
        .await?;

    Ok(Json(InstitutionResponse::from(institution)))
}

pub async fn delete_institution_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(institution_id): Path<InstitutionId>,
) -> ApiResult<StatusCode> {
    state
        .institution_service
        .delete_institution(&user, institution_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
