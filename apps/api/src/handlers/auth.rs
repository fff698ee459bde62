use axum::Json;
use axum::extract::{Extension, State};
use chrono::Utc;

use tenura_core::UserIdentity;

use crate::dto::{LoginRequest, LoginResponse, LogoutResponse, UserIdentityResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let session = state
        .auth_service
        .login(
            payload.username.as_str(),
            payload.password.as_str(),
            payload.institution_id,
            Utc::now(),
        )
        .await?;

    Ok(Json(LoginResponse::from(session)))
}

pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<LogoutResponse>> {
    let token = state.auth_service.logout(&user, Utc::now())?;
    Ok(Json(LogoutResponse::from(token)))
}

pub async fn me_handler(Extension(user): Extension<UserIdentity>) -> Json<UserIdentityResponse> {
    Json(UserIdentityResponse::from(user))
}
