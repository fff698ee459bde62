use super::*;

impl PostgresSecurityAdminRepository {
    pub(super) async fn list_permissions_impl(&self) -> AppResult<Vec<PermissionDefinition>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, service, resource, action, is_active, is_high_risk, description
            FROM permissions
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(read_error("list permissions"))?;

        rows.into_iter().map(PermissionRow::into_permission).collect()
    }

    pub(super) async fn find_permission_impl(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<PermissionDefinition>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, service, resource, action, is_active, is_high_risk, description
            FROM permissions
            WHERE id = $1
            "#,
        )
        .bind(permission_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(read_error("load permission"))?
        .map(PermissionRow::into_permission)
        .transpose()
    }

    pub(super) async fn create_permission_impl(
        &self,
        permission: &PermissionDefinition,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO permissions (
                id, name, service, resource, action, is_active, is_high_risk, description
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(permission.id().as_uuid())
        .bind(permission.name())
        .bind(permission.service())
        .bind(permission.resource())
        .bind(permission.action())
        .bind(permission.is_active())
        .bind(permission.is_high_risk())
        .bind(permission.description())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_write_error(
                error,
                "create permission",
                format!("permission '{}' already exists", permission.name()),
            )
        })?;

        Ok(())
    }

    pub(super) async fn update_permission_impl(
        &self,
        permission: &PermissionDefinition,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE permissions
            SET is_active = $2,
                is_high_risk = $3,
                description = $4,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(permission.id().as_uuid())
        .bind(permission.is_active())
        .bind(permission.is_high_risk())
        .bind(permission.description())
        .execute(&self.pool)
        .await
        .map_err(read_error("update permission"))?;

        Ok(())
    }

    pub(super) async fn list_roles_granted_permission_impl(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Vec<RoleId>> {
        let role_ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT role_id
            FROM role_permissions
            WHERE permission_id = $1
            "#,
        )
        .bind(permission_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(read_error("list roles holding permission"))?;

        Ok(role_ids.into_iter().map(RoleId::from_uuid).collect())
    }
}
