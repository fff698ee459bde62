use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use tenura_application::{AuthorizationRepository, RoleMenuAccess, RolePermissionName};
use tenura_core::{AppResult, MenuId, RoleId};
use tenura_domain::{MethodAccess, Role};

use crate::postgres_rows::{RoleRow, read_error, role_uuids};

/// PostgreSQL-backed lookups behind the permission cache and scope resolver.
#[derive(Clone)]
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RolePermissionRow {
    role_id: Uuid,
    permission_name: String,
}

#[derive(Debug, FromRow)]
struct RoleMenuAccessRow {
    role_id: Uuid,
    menu_id: Uuid,
    access: String,
}

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    async fn list_permission_names_for_roles(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<RolePermissionName>> {
        let rows = sqlx::query_as::<_, RolePermissionRow>(
            r#"
            SELECT
                role_permissions.role_id,
                permissions.name AS permission_name
            FROM role_permissions
            INNER JOIN roles
                ON roles.id = role_permissions.role_id
            INNER JOIN permissions
                ON permissions.id = role_permissions.permission_id
            WHERE role_permissions.role_id = ANY($1)
                AND roles.is_active
                AND permissions.is_active
            "#,
        )
        .bind(role_uuids(role_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(read_error("load role permissions"))?;

        Ok(rows
            .into_iter()
            .map(|row| RolePermissionName {
                role_id: RoleId::from_uuid(row.role_id),
                permission_name: row.permission_name,
            })
            .collect())
    }

    async fn list_menu_access_for_roles(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<RoleMenuAccess>> {
        let rows = sqlx::query_as::<_, RoleMenuAccessRow>(
            r#"
            SELECT
                role_menus.role_id,
                role_menus.menu_id,
                role_menus.access
            FROM role_menus
            INNER JOIN roles
                ON roles.id = role_menus.role_id
            INNER JOIN menus
                ON menus.id = role_menus.menu_id
            WHERE role_menus.role_id = ANY($1)
                AND roles.is_active
                AND menus.is_active
            "#,
        )
        .bind(role_uuids(role_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(read_error("load role menu access"))?;

        Ok(rows
            .into_iter()
            .map(|row| RoleMenuAccess {
                role_id: RoleId::from_uuid(row.role_id),
                menu_id: MenuId::from_uuid(row.menu_id),
                methods: MethodAccess::parse(&row.access),
            })
            .collect())
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        find_role(&self.pool, role_id).await
    }
}

pub(crate) async fn find_role(pool: &PgPool, role_id: RoleId) -> AppResult<Option<Role>> {
    sqlx::query_as::<_, RoleRow>(
        r#"
        SELECT id, name, description, scope, institution_id, is_active, is_administrator
        FROM roles
        WHERE id = $1
        "#,
    )
    .bind(role_id.as_uuid())
    .fetch_optional(pool)
    .await
    .map_err(read_error("load role"))?
    .map(RoleRow::into_role)
    .transpose()
}
