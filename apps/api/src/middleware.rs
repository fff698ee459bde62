use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use tenura_application::AccessRequirement;
use tenura_core::{AppError, MenuId};

use crate::error::ApiResult;
use crate::state::AppState;

pub const PERMISSION_HEADER: &str = "app-permission";
pub const MENU_HEADER: &str = "app-menu-id";

/// Admits or rejects the request before any handler runs and hands the
/// verified identity to handlers through request extensions.
///
/// The bearer token is verified before any marker header is read.
pub async fn require_access(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let bearer_token = bearer_token(request.headers())?;
    let identity = state
        .authorization_gate
        .authenticate(bearer_token.as_deref(), Utc::now())?;

    let requirement = effective_requirement(
        request.extensions().get::<AccessRequirement>(),
        request.headers(),
    )?;
    let method = request.method().as_str().to_owned();

    let identity = tokio::time::timeout(
        state.resolution_timeout,
        state
            .authorization_gate
            .authorize(identity, &requirement, &method),
    )
    .await
    .map_err(|_| AppError::Internal("access resolution timed out".to_owned()))??;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

fn effective_requirement(
    declared: Option<&AccessRequirement>,
    headers: &HeaderMap,
) -> ApiResult<AccessRequirement> {
    let mut requirement = match declared {
        Some(declared) => declared.clone(),
        None => header_value(headers, PERMISSION_HEADER)?
            .map(AccessRequirement::permission)
            .unwrap_or_default(),
    };

    if requirement.required_permission().is_some() {
        return Ok(requirement);
    }

    if let Some(menu_id) = header_value(headers, MENU_HEADER)? {
        requirement = requirement.with_menu(menu_id.parse::<MenuId>()?);
    }

    Ok(requirement)
}

fn bearer_token(headers: &HeaderMap) -> ApiResult<Option<String>> {
    let Some(authorization) = header_value(headers, header::AUTHORIZATION.as_str())? else {
        return Ok(None);
    };

    let (scheme, token) = authorization
        .split_once(' ')
        .ok_or_else(|| AppError::Unauthorized("malformed authorization header".to_owned()))?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(
            AppError::Unauthorized(format!("unsupported authorization scheme '{scheme}'")).into(),
        );
    }

    Ok(Some(token.trim().to_owned()))
}

fn header_value(headers: &HeaderMap, name: &str) -> ApiResult<Option<String>> {
    headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map(|value| value.trim().to_owned())
                .map_err(|_| AppError::Validation(format!("header '{name}' is not valid text")))
        })
        .transpose()
        .map(|value| value.filter(|value| !value.is_empty()))
        .map_err(Into::into)
}
