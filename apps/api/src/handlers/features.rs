use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use tenura_core::{FeatureId, InstitutionId, UserIdentity};

use crate::dto::{
    EffectiveFeatureResponse, FeatureResponse, InstitutionFeatureResponse, SaveFeatureRequest,
    SetInstitutionFeatureRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_features_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<FeatureResponse>>> {
    let features = state
        .feature_service
        .list_features()
        .await?
        .into_iter()
        .map(FeatureResponse::from)
        .collect();

    Ok(Json(features))
}

pub async fn create_feature_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<SaveFeatureRequest>,
) -> ApiResult<(StatusCode, Json<FeatureResponse>)> {
    let feature = state
        .feature_service
        .create_feature(&user, payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(FeatureResponse::from(feature))))
}

pub async fn update_feature_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(feature_id): Path<FeatureId>,
    Json(payload): Json<SaveFeatureRequest>,
) -> ApiResult<Json<FeatureResponse>> {
    let feature = state
        .feature_service
        .update_feature(&user, feature_id, payload.into())
        .await?;

    Ok(Json(FeatureResponse::from(feature)))
}

pub async fn list_institution_features_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(institution_id): Path<InstitutionId>,
) -> ApiResult<Json<Vec<EffectiveFeatureResponse>>> {
    let features = state
        .feature_service
        .list_institution_features(&user, institution_id)
        .await?
        .into_iter()
        .map(EffectiveFeatureResponse::from)
        .collect();

    Ok(Json(features))
}

pub async fn set_institution_feature_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(institution_id): Path<InstitutionId>,
    Json(payload): Json<SetInstitutionFeatureRequest>,
) -> ApiResult<Json<InstitutionFeatureResponse>> {
    let feature = state
        .feature_service
        .set_institution_feature(
            &user,
            institution_id,
            payload.feature_key.as_str(),
            payload.is_enabled,
        )
        .await?;

    Ok(Json(InstitutionFeatureResponse::from(feature)))
}
