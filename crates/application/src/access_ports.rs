use async_trait::async_trait;

use tenura_core::{AppResult, MenuId, RoleId};
use tenura_domain::{AccessMap, MethodAccess, Role};

/// Active permission granted to a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePermissionName {
    /// Role holding the grant.
    pub role_id: RoleId,
    /// Permission name.
    pub permission_name: String,
}

/// Menu access granted to a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMenuAccess {
    /// Role holding the grant.
    pub role_id: RoleId,
    /// Mapped menu.
    pub menu_id: MenuId,
    /// Allowed methods on the menu route.
    pub methods: MethodAccess,
}

/// Storage shapes consumed by permission resolution and scope checks.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Lists active permissions granted to active roles in the set.
    async fn list_permission_names_for_roles(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<RolePermissionName>>;

    /// Lists active menu grants of active roles in the set.
    async fn list_menu_access_for_roles(&self, role_ids: &[RoleId])
    -> AppResult<Vec<RoleMenuAccess>>;

    /// Finds a role with its scope and institution binding.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>>;
}

/// Shared store of per-role access maps.
///
/// Implementations replace whole entries; readers never observe a partially
/// written map.
#[async_trait]
pub trait AccessCache: Send + Sync {
    /// Returns the cached access map for a role.
    async fn get(&self, role_id: RoleId) -> AppResult<Option<AccessMap>>;

    /// Stores the access map for a role, replacing any previous entry.
    async fn put(&self, role_id: RoleId, access: &AccessMap) -> AppResult<()>;

    /// Drops the entry for a role.
    async fn invalidate(&self, role_id: RoleId) -> AppResult<()>;
}
