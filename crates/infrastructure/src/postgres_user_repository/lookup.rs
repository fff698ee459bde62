use super::*;

impl PostgresUserRepository {
    pub(super) async fn list_users_impl(
        &self,
        institution_id: Option<InstitutionId>,
    ) -> AppResult<Vec<UserRecord>> {
        let institution_uuid = institution_id.map(|id| id.as_uuid());
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT users.id, users.username, users.email, users.full_name,
                   users.short_name, users.is_active
            FROM users
            WHERE $1::UUID IS NULL
                OR EXISTS (
                    SELECT 1
                    FROM user_institutions
                    WHERE user_institutions.user_id = users.id
                        AND user_institutions.institution_id = $1
                )
            ORDER BY users.username
            "#,
        )
        .bind(institution_uuid)
        .fetch_all(&self.pool)
        .await
        .map_err(read_error("list users"))?;

        let user_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut memberships = self.load_memberships(&user_ids, institution_uuid).await?;

        rows.into_iter()
            .map(|row| {
                let memberships = memberships.remove(&row.id).unwrap_or_default();
                Ok(UserRecord {
                    account: row.into_account()?,
                    memberships,
                })
            })
            .collect()
    }

    pub(super) async fn find_user_impl(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        let Some(row) = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, full_name, short_name, is_active
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(read_error("find user"))?
        else {
            return Ok(None);
        };

        let memberships = self
            .load_memberships(&[row.id], None)
            .await?
            .remove(&row.id)
            .unwrap_or_default();

        Ok(Some(UserRecord {
            account: row.into_account()?,
            memberships,
        }))
    }

    async fn load_memberships(
        &self,
        user_ids: &[Uuid],
        institution_id: Option<Uuid>,
    ) -> AppResult<HashMap<Uuid, Vec<UserMembership>>> {
        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT
                user_institutions.user_id,
                user_institutions.institution_id,
                institutions.name AS institution_name,
                COALESCE(
                    array_agg(user_roles.role_id ORDER BY user_roles.role_id)
                        FILTER (WHERE user_roles.role_id IS NOT NULL),
                    '{}'
                ) AS role_ids
            FROM user_institutions
            INNER JOIN institutions
                ON institutions.id = user_institutions.institution_id
            LEFT JOIN user_roles
                ON user_roles.user_id = user_institutions.user_id
                AND user_roles.institution_id = user_institutions.institution_id
            WHERE user_institutions.user_id = ANY($1)
                AND ($2::UUID IS NULL OR user_institutions.institution_id = $2)
            GROUP BY user_institutions.user_id, user_institutions.institution_id, institutions.name
            ORDER BY institutions.name
            "#,
        )
        .bind(user_ids)
        .bind(institution_id)
        .fetch_all(&self.pool)
        .await
        .map_err(read_error("load user memberships"))?;

        let mut memberships: HashMap<Uuid, Vec<UserMembership>> = HashMap::new();
        for row in rows {
            memberships
                .entry(row.user_id)
                .or_default()
                .push(UserMembership {
                    institution_id: InstitutionId::from_uuid(row.institution_id),
                    institution_name: row.institution_name,
                    role_ids: row.role_ids.into_iter().map(RoleId::from_uuid).collect(),
                });
        }

        Ok(memberships)
    }
}
