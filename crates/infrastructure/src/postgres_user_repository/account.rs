use super::*;

impl PostgresUserRepository {
    pub(super) async fn create_user_impl(
        &self,
        account: &UserAccount,
        password_hash: &str,
        institution_id: InstitutionId,
        role_ids: &[RoleId],
    ) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, full_name, short_name, password_hash, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(account.id().as_uuid())
        .bind(account.username())
        .bind(account.email())
        .bind(account.full_name())
        .bind(account.short_name())
        .bind(password_hash)
        .bind(account.is_active())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            map_write_error(
                error,
                "create user",
                format!("username '{}' is taken", account.username()),
            )
        })?;

        sqlx::query(
            r#"
            INSERT INTO user_institutions (user_id, institution_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(account.id().as_uuid())
        .bind(institution_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(read_error("create user membership"))?;

        replace_roles(&mut transaction, account.id(), institution_id, role_ids).await?;

        commit(transaction).await
    }

    pub(super) async fn update_user_impl(
        &self,
        account: &UserAccount,
        password_hash: Option<&str>,
        roles: Option<(InstitutionId, &[RoleId])>,
    ) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        let rows_affected = sqlx::query(
            r#"
            UPDATE users
            SET email = $2,
                full_name = $3,
                short_name = $4,
                is_active = $5,
                password_hash = COALESCE($6, password_hash),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(account.id().as_uuid())
        .bind(account.email())
        .bind(account.full_name())
        .bind(account.short_name())
        .bind(account.is_active())
        .bind(password_hash)
        .execute(&mut *transaction)
        .await
        .map_err(read_error("update user"))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "user '{}' does not exist",
                account.id()
            )));
        }

        if let Some((institution_id, role_ids)) = roles {
            replace_roles(&mut transaction, account.id(), institution_id, role_ids).await?;
        }

        commit(transaction).await
    }

    pub(super) async fn delete_user_impl(&self, user_id: UserId) -> AppResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(read_error("delete user"))?;

        Ok(())
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))
    }
}

async fn replace_roles(
    transaction: &mut Transaction<'static, Postgres>,
    user_id: UserId,
    institution_id: InstitutionId,
    role_ids: &[RoleId],
) -> AppResult<()> {
    sqlx::query(
        r#"
        DELETE FROM user_roles
        WHERE user_id = $1 AND institution_id = $2
        "#,
    )
    .bind(user_id.as_uuid())
    .bind(institution_id.as_uuid())
    .execute(&mut **transaction)
    .await
    .map_err(read_error("clear user roles"))?;

    sqlx::query(
        r#"
        INSERT INTO user_roles (user_id, institution_id, role_id)
        SELECT $1, $2, role_id
        FROM UNNEST($3::UUID[]) AS role_id
        "#,
    )
    .bind(user_id.as_uuid())
    .bind(institution_id.as_uuid())
    .bind(role_uuids(role_ids))
    .execute(&mut **transaction)
    .await
    .map_err(read_error("insert user roles"))?;

    Ok(())
}

async fn commit(transaction: Transaction<'static, Postgres>) -> AppResult<()> {
    transaction
        .commit()
        .await
        .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))
}
