use tenura_application::{
    AuditLogEntry, CreatePermissionInput, CreateRoleInput, RoleMenuMapping, UpdateRoleInput,
};
use tenura_core::AppResult;
use tenura_domain::{PermissionDefinition, PermissionMutableUpdate, Role, RoleMenuGrant};

use super::{
    AssignRoleMenusRequest, AuditLogEntryResponse, CreatePermissionRequest, CreateRoleRequest,
    MenuResponse, PermissionResponse, RoleMenuResponse, RoleResponse, UpdatePermissionRequest,
    UpdateRoleRequest,
};

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self {
            role_id: role.id(),
            name: role.name().to_owned(),
            description: role.description().to_owned(),
            scope: role.scope(),
            institution_id: role.institution_id(),
            is_active: role.is_active(),
            is_administrator: role.is_administrator(),
        }
    }
}

impl From<CreateRoleRequest> for CreateRoleInput {
    fn from(request: CreateRoleRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            scope: request.scope,
            institution_id: request.institution_id,
            is_administrator: request.is_administrator,
        }
    }
}

impl From<UpdateRoleRequest> for UpdateRoleInput {
    fn from(request: UpdateRoleRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            is_active: request.is_active,
            is_administrator: request.is_administrator,
        }
    }
}

impl From<PermissionDefinition> for PermissionResponse {
    fn from(permission: PermissionDefinition) -> Self {
        Self {
            permission_id: permission.id(),
            name: permission.name().to_owned(),
            service: permission.service().to_owned(),
            resource: permission.resource().to_owned(),
            action: permission.action().to_owned(),
            is_active: permission.is_active(),
            is_high_risk: permission.is_high_risk(),
            description: permission.description().to_owned(),
        }
    }
}

impl From<CreatePermissionRequest> for CreatePermissionInput {
    fn from(request: CreatePermissionRequest) -> Self {
        Self {
            name: request.name,
            service: request.service,
            resource: request.resource,
            action: request.action,
            is_high_risk: request.is_high_risk,
            description: request.description,
        }
    }
}

impl From<UpdatePermissionRequest> for PermissionMutableUpdate {
    fn from(request: UpdatePermissionRequest) -> Self {
        Self {
            is_active: request.is_active,
            is_high_risk: request.is_high_risk,
            description: request.description,
        }
    }
}

impl AssignRoleMenusRequest {
    /// Parses every access string into a grant.
    pub fn into_grants(self) -> AppResult<Vec<RoleMenuGrant>> {
        self.menus
            .into_iter()
            .map(|menu| RoleMenuGrant::new(menu.menu_id, &menu.access))
            .collect()
    }
}

impl From<RoleMenuMapping> for RoleMenuResponse {
    fn from(mapping: RoleMenuMapping) -> Self {
        Self {
            access: mapping.methods.to_access_string(),
            menu: MenuResponse::from(mapping.menu),
        }
    }
}

impl From<AuditLogEntry> for AuditLogEntryResponse {
    fn from(entry: AuditLogEntry) -> Self {
        Self {
            event_id: entry.event_id,
            actor_user_id: entry.actor_user_id,
            institution_id: entry.institution_id,
            action: entry.action,
            resource_type: entry.resource_type,
            resource_id: entry.resource_id,
            detail: entry.detail,
            created_at: entry.created_at,
        }
    }
}
