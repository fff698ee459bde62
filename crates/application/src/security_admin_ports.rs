use async_trait::async_trait;

use tenura_core::{AppResult, InstitutionId, PermissionId, RoleId};
use tenura_domain::{MenuDefinition, MethodAccess, PermissionDefinition, Role, RoleMenuGrant, RoleScope};

/// Input payload for creating a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Role name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Visibility granted by the role.
    pub scope: RoleScope,
    /// Owning institution, required for institution roles.
    pub institution_id: Option<InstitutionId>,
    /// Administrator flag.
    pub is_administrator: bool,
}

/// Input payload for updating a role. Scope and institution are fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// Role name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Active flag.
    pub is_active: bool,
    /// Administrator flag.
    pub is_administrator: bool,
}

/// Input payload for creating a permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePermissionInput {
    /// Globally unique name.
    pub name: String,
    /// Owning service.
    pub service: String,
    /// Resource.
    pub resource: String,
    /// Action.
    pub action: String,
    /// High-risk flag.
    pub is_high_risk: bool,
    /// Description.
    pub description: String,
}

/// Menu mapped onto a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMenuMapping {
    /// Menu definition.
    pub menu: MenuDefinition,
    /// Allowed methods.
    pub methods: MethodAccess,
}

/// Repository port for roles, permissions and their grants.
#[async_trait]
pub trait SecurityAdminRepository: Send + Sync {
    /// Lists roles. With an institution, only that institution's roles.
    async fn list_roles(&self, institution_id: Option<InstitutionId>) -> AppResult<Vec<Role>>;

    /// Finds a role.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Inserts a role.
    async fn create_role(&self, role: &Role) -> AppResult<()>;

    /// Persists the mutable fields of a role.
    async fn update_role(&self, role: &Role) -> AppResult<()>;

    /// Lists every permission.
    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>>;

    /// Finds a permission.
    async fn find_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<PermissionDefinition>>;

    /// Inserts a permission. Duplicate names are a conflict.
    async fn create_permission(&self, permission: &PermissionDefinition) -> AppResult<()>;

    /// Persists active flag, high-risk flag and description.
    async fn update_permission(&self, permission: &PermissionDefinition) -> AppResult<()>;

    /// Lists roles currently granted a permission.
    async fn list_roles_granted_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Vec<RoleId>>;

    /// Lists the permissions granted to a role.
    async fn list_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<PermissionDefinition>>;

    /// Replaces a role's permission set in one transaction. Unknown
    /// permission ids abort the transaction and leave the prior set intact.
    async fn replace_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<()>;

    /// Lists menus mapped to a role.
    async fn list_role_menus(&self, role_id: RoleId) -> AppResult<Vec<RoleMenuMapping>>;

    /// Replaces a role's menu mappings in one transaction.
    async fn replace_role_menus(&self, role_id: RoleId, grants: &[RoleMenuGrant]) -> AppResult<()>;
}
