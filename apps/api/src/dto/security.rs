use serde::{Deserialize, Serialize};
use serde_json::Value;
use tenura_core::{InstitutionId, MenuId, PermissionId, RoleId, UserId};
use tenura_domain::RoleScope;

use super::MenuResponse;

mod conversions;

/// Incoming payload for role creation.
#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub scope: RoleScope,
    pub institution_id: Option<InstitutionId>,
    #[serde(default)]
    pub is_administrator: bool,
}

/// Incoming payload for role updates. Scope and institution are fixed.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub is_active: bool,
    #[serde(default)]
    pub is_administrator: bool,
}

/// API representation of a role.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role_id: RoleId,
    pub name: String,
    pub description: String,
    pub scope: RoleScope,
    pub institution_id: Option<InstitutionId>,
    pub is_active: bool,
    pub is_administrator: bool,
}

/// Incoming payload for permission creation.
#[derive(Debug, Deserialize)]
pub struct CreatePermissionRequest {
    pub name: String,
    pub service: String,
    pub resource: String,
    pub action: String,
    #[serde(default)]
    pub is_high_risk: bool,
    #[serde(default)]
    pub description: String,
}

/// Incoming payload for the mutable permission fields.
#[derive(Debug, Deserialize)]
pub struct UpdatePermissionRequest {
    pub is_active: Option<bool>,
    pub is_high_risk: Option<bool>,
    pub description: Option<String>,
}

/// API representation of a permission.
#[derive(Debug, Serialize)]
pub struct PermissionResponse {
    pub permission_id: PermissionId,
    pub name: String,
    pub service: String,
    pub resource: String,
    pub action: String,
    pub is_active: bool,
    pub is_high_risk: bool,
    pub description: String,
}

/// Replacement permission set for a role.
#[derive(Debug, Deserialize)]
pub struct AssignRolePermissionsRequest {
    pub permission_ids: Vec<PermissionId>,
}

/// One menu mapping in a role menu replacement.
#[derive(Debug, Deserialize)]
pub struct RoleMenuRequest {
    pub menu_id: MenuId,
    pub access: String,
}

/// Replacement menu mappings for a role.
#[derive(Debug, Deserialize)]
pub struct AssignRoleMenusRequest {
    pub menus: Vec<RoleMenuRequest>,
}

/// Menu mapped onto a role.
#[derive(Debug, Serialize)]
pub struct RoleMenuResponse {
    pub menu: MenuResponse,
    pub access: String,
}

/// Audit listing parameters.
#[derive(Debug, Deserialize)]
pub struct AuditLogQueryParams {
    pub limit: Option<usize>,
}

/// API representation of an audit entry.
#[derive(Debug, Serialize)]
pub struct AuditLogEntryResponse {
    pub event_id: String,
    pub actor_user_id: UserId,
    pub institution_id: Option<InstitutionId>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
    pub detail: Option<Value>,
    pub created_at: String,
}
