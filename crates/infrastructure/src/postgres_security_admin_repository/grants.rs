use super::*;

#[derive(Debug, FromRow)]
struct RoleMenuRow {
    #[sqlx(flatten)]
    menu: MenuRow,
    access: String,
}

impl PostgresSecurityAdminRepository {
    pub(super) async fn list_role_permissions_impl(
        &self,
        role_id: RoleId,
    ) -> AppResult<Vec<PermissionDefinition>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT
                permissions.id,
                permissions.name,
                permissions.service,
                permissions.resource,
                permissions.action,
                permissions.is_active,
                permissions.is_high_risk,
                permissions.description
            FROM role_permissions
            INNER JOIN permissions
                ON permissions.id = role_permissions.permission_id
            WHERE role_permissions.role_id = $1
            ORDER BY permissions.name
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(read_error("list role permissions"))?;

        rows.into_iter().map(PermissionRow::into_permission).collect()
    }

    /// Deletes and reinserts the role's grants in one transaction. Any
    /// failure rolls back to the previous set.
    pub(super) async fn replace_role_permissions_impl(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        let permission_uuids: Vec<Uuid> =
            permission_ids.iter().map(PermissionId::as_uuid).collect();

        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        let known = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM permissions
            WHERE id = ANY($1)
            "#,
        )
        .bind(&permission_uuids)
        .fetch_one(&mut *transaction)
        .await
        .map_err(read_error("check permissions"))?;

        if usize::try_from(known).unwrap_or_default() != permission_uuids.len() {
            return Err(AppError::NotFound(
                "one or more permissions do not exist".to_owned(),
            ));
        }

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(read_error("clear role permissions"))?;

        sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_id)
            SELECT $1, permission_id
            FROM UNNEST($2::UUID[]) AS permission_id
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(&permission_uuids)
        .execute(&mut *transaction)
        .await
        .map_err(read_error("insert role permissions"))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })
    }

    pub(super) async fn list_role_menus_impl(
        &self,
        role_id: RoleId,
    ) -> AppResult<Vec<RoleMenuMapping>> {
        let rows = sqlx::query_as::<_, RoleMenuRow>(
            r#"
            SELECT
                menus.id,
                menus.menu_key,
                menus.name,
                menus.route,
                menus.icon,
                menus.parent_id,
                menus.sort_order,
                menus.feature_key,
                menus.is_active,
                role_menus.access
            FROM role_menus
            INNER JOIN menus
                ON menus.id = role_menus.menu_id
            WHERE role_menus.role_id = $1
            ORDER BY menus.sort_order, menus.name
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(read_error("list role menus"))?;

        rows.into_iter()
            .map(|row| {
                Ok(RoleMenuMapping {
                    methods: MethodAccess::parse(&row.access),
                    menu: row.menu.into_menu()?,
                })
            })
            .collect()
    }

    pub(super) async fn replace_role_menus_impl(
        &self,
        role_id: RoleId,
        grants: &[RoleMenuGrant],
    ) -> AppResult<()> {
        let menu_ids: Vec<Uuid> = grants.iter().map(|grant| grant.menu_id.as_uuid()).collect();
        let access: Vec<String> = grants
            .iter()
            .map(|grant| grant.methods.to_access_string())
            .collect();

        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        sqlx::query("DELETE FROM role_menus WHERE role_id = $1")
            .bind(role_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(read_error("clear role menus"))?;

        if !menu_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO role_menus (role_id, menu_id, access)
                SELECT $1, grants.menu_id, grants.access
                FROM UNNEST($2::UUID[], $3::TEXT[]) AS grants(menu_id, access)
                "#,
            )
            .bind(role_id.as_uuid())
            .bind(&menu_ids)
            .bind(&access)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                if let sqlx::Error::Database(database_error) = &error
                    && database_error.code().as_deref() == Some("23503")
                {
                    return AppError::NotFound("one or more menus do not exist".to_owned());
                }
                AppError::Internal(format!("failed to insert role menus: {error}"))
            })?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })
    }
}
