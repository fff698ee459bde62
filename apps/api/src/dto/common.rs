use serde::Serialize;
use tenura_core::{InstitutionId, RoleId, UserId, UserIdentity};

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    pub postgres: HealthDependencyStatus,
    pub redis: HealthDependencyStatus,
}

/// Status of one backing service.
#[derive(Debug, Serialize)]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// API representation of the authenticated caller.
#[derive(Debug, Serialize)]
pub struct UserIdentityResponse {
    pub user_id: UserId,
    pub username: String,
    pub role_ids: Vec<RoleId>,
    /// Comma-joined role ids, for clients forwarding them as request metadata.
    pub role_ids_joined: String,
    pub institution_id: Option<InstitutionId>,
}

impl From<UserIdentity> for UserIdentityResponse {
    fn from(identity: UserIdentity) -> Self {
        Self {
            user_id: identity.user_id(),
            username: identity.username().to_owned(),
            role_ids: identity.role_ids().to_vec(),
            role_ids_joined: identity.role_ids_joined(),
            institution_id: identity.institution_id(),
        }
    }
}
