use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use tenura_application::{RoleMenuMapping, SecurityAdminRepository};
use tenura_core::{AppError, AppResult, InstitutionId, PermissionId, RoleId};
use tenura_domain::{MethodAccess, PermissionDefinition, Role, RoleMenuGrant};

use crate::postgres_rows::{MenuRow, PermissionRow, RoleRow, map_write_error, read_error};

mod grants;
mod permissions;
mod roles;
#[cfg(test)]
mod tests;

/// PostgreSQL-backed repository for role, permission and grant
/// administration.
#[derive(Clone)]
pub struct PostgresSecurityAdminRepository {
    pool: PgPool,
}

impl PostgresSecurityAdminRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SecurityAdminRepository for PostgresSecurityAdminRepository {
    async fn list_roles(&self, institution_id: Option<InstitutionId>) -> AppResult<Vec<Role>> {
        self.list_roles_impl(institution_id).await
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        crate::postgres_authorization_repository::find_role(&self.pool, role_id).await
    }

    async fn create_role(&self, role: &Role) -> AppResult<()> {
        self.create_role_impl(role).await
    }

    async fn update_role(&self, role: &Role) -> AppResult<()> {
        self.update_role_impl(role).await
    }

    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>> {
        self.list_permissions_impl().await
    }

    async fn find_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<PermissionDefinition>> {
        self.find_permission_impl(permission_id).await
    }

    async fn create_permission(&self, permission: &PermissionDefinition) -> AppResult<()> {
        self.create_permission_impl(permission).await
    }

    async fn update_permission(&self, permission: &PermissionDefinition) -> AppResult<()> {
        self.update_permission_impl(permission).await
    }

    async fn list_roles_granted_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Vec<RoleId>> {
        self.list_roles_granted_permission_impl(permission_id).await
    }

    async fn list_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<PermissionDefinition>> {
        self.list_role_permissions_impl(role_id).await
    }

    async fn replace_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        self.replace_role_permissions_impl(role_id, permission_ids)
            .await
    }

    async fn list_role_menus(&self, role_id: RoleId) -> AppResult<Vec<RoleMenuMapping>> {
        self.list_role_menus_impl(role_id).await
    }

    async fn replace_role_menus(&self, role_id: RoleId, grants: &[RoleMenuGrant]) -> AppResult<()> {
        self.replace_role_menus_impl(role_id, grants).await
    }
}
