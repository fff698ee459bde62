use super::*;

impl PostgresSecurityAdminRepository {
    pub(super) async fn list_roles_impl(
        &self,
        institution_id: Option<InstitutionId>,
    ) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, scope, institution_id, is_active, is_administrator
            FROM roles
            WHERE $1::UUID IS NULL OR institution_id = $1
            ORDER BY scope DESC, name
            "#,
        )
        .bind(institution_id.map(|id| id.as_uuid()))
        .fetch_all(&self.pool)
        .await
        .map_err(read_error("list roles"))?;

        rows.into_iter().map(RoleRow::into_role).collect()
    }

    pub(super) async fn create_role_impl(&self, role: &Role) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO roles (id, name, description, scope, institution_id, is_active, is_administrator)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(role.id().as_uuid())
        .bind(role.name())
        .bind(role.description())
        .bind(role.scope().as_str())
        .bind(role.institution_id().map(|id| id.as_uuid()))
        .bind(role.is_active())
        .bind(role.is_administrator())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_write_error(
                error,
                "create role",
                format!("role '{}' already exists", role.name()),
            )
        })?;

        Ok(())
    }

    pub(super) async fn update_role_impl(&self, role: &Role) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE roles
            SET name = $2,
                description = $3,
                is_active = $4,
                is_administrator = $5,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(role.id().as_uuid())
        .bind(role.name())
        .bind(role.description())
        .bind(role.is_active())
        .bind(role.is_administrator())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_write_error(
                error,
                "update role",
                format!("role '{}' already exists", role.name()),
            )
        })?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "role '{}' does not exist",
                role.id()
            )));
        }

        Ok(())
    }
}
