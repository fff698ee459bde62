mod auth;
mod catalogue;
mod common;
mod security;
mod users;

pub use auth::{LoginRequest, LoginResponse, LogoutResponse};
pub use catalogue::{
    EffectiveFeatureResponse, FeatureResponse, InstitutionFeatureResponse, InstitutionResponse,
    MenuResponse, SaveFeatureRequest, SaveInstitutionRequest, SaveMenuRequest,
    SetInstitutionFeatureRequest,
};
pub use common::{HealthDependencyStatus, HealthResponse, UserIdentityResponse};
pub use security::{
    AssignRoleMenusRequest, AssignRolePermissionsRequest, AuditLogEntryResponse,
    AuditLogQueryParams, CreatePermissionRequest, CreateRoleRequest, PermissionResponse,
    RoleMenuResponse, RoleResponse, UpdatePermissionRequest, UpdateRoleRequest,
};
pub use users::{CreateUserRequest, UpdateUserRequest, UserResponse};

fn rfc3339(instant: chrono::DateTime<chrono::Utc>) -> String {
    instant.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
