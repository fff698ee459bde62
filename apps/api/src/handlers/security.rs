use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;

use tenura_core::{PermissionId, RoleId, UserIdentity};

use crate::dto::{
    AssignRoleMenusRequest, AssignRolePermissionsRequest, AuditLogEntryResponse,
    AuditLogQueryParams, CreatePermissionRequest, CreateRoleRequest, PermissionResponse,
    RoleMenuResponse, RoleResponse, UpdatePermissionRequest, UpdateRoleRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod audit;
mod permissions;
mod roles;

pub use audit::list_audit_log_handler;
pub use permissions::{
    create_permission_handler, list_permissions_handler, update_permission_handler,
};
pub use roles::{
    assign_role_menus_handler, assign_role_permissions_handler, create_role_handler,
    get_role_handler, list_role_menus_handler, list_role_permissions_handler, list_roles_handler,
    update_role_handler,
};
