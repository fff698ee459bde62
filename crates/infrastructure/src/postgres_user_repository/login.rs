use super::*;

#[derive(Debug, FromRow)]
struct LoginRow {
    id: Uuid,
    username: String,
    full_name: String,
    short_name: String,
    password_hash: String,
    is_active: bool,
    institution_name: String,
    role_ids: Vec<Uuid>,
}

#[derive(Debug, FromRow)]
struct RoleMenuEntryRow {
    role_id: Uuid,
    access: String,
    #[sqlx(flatten)]
    menu: MenuRow,
}

impl PostgresUserRepository {
    pub(super) async fn find_login_account_impl(
        &self,
        username: &str,
        institution_id: InstitutionId,
    ) -> AppResult<Option<LoginAccount>> {
        let row = sqlx::query_as::<_, LoginRow>(
            r#"
            SELECT
                users.id,
                users.username,
                users.full_name,
                users.short_name,
                users.password_hash,
                users.is_active,
                institutions.name AS institution_name,
                COALESCE(
                    array_agg(user_roles.role_id ORDER BY user_roles.role_id)
                        FILTER (WHERE user_roles.role_id IS NOT NULL),
                    '{}'
                ) AS role_ids
            FROM users
            INNER JOIN user_institutions
                ON user_institutions.user_id = users.id
            INNER JOIN institutions
                ON institutions.id = user_institutions.institution_id
                AND institutions.is_active
            LEFT JOIN user_roles
                ON user_roles.user_id = users.id
                AND user_roles.institution_id = user_institutions.institution_id
            WHERE users.username = $1
                AND user_institutions.institution_id = $2
            GROUP BY users.id, institutions.name
            "#,
        )
        .bind(username)
        .bind(institution_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(read_error("load login account"))?;

        Ok(row.map(|row| LoginAccount {
            user_id: UserId::from_uuid(row.id),
            username: row.username,
            full_name: row.full_name,
            short_name: row.short_name,
            password_hash: row.password_hash,
            is_active: row.is_active,
            institution_id,
            institution_name: row.institution_name,
            role_ids: row.role_ids.into_iter().map(RoleId::from_uuid).collect(),
        }))
    }

    pub(super) async fn list_menus_for_roles_impl(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<RoleMenuEntry>> {
        let rows = sqlx::query_as::<_, RoleMenuEntryRow>(
            r#"
            SELECT
                role_menus.role_id,
                role_menus.access,
                menus.id,
                menus.menu_key,
                menus.name,
                menus.route,
                menus.icon,
                menus.parent_id,
                menus.sort_order,
                menus.feature_key,
                menus.is_active
            FROM role_menus
            INNER JOIN roles
                ON roles.id = role_menus.role_id
                AND roles.is_active
            INNER JOIN menus
                ON menus.id = role_menus.menu_id
                AND menus.is_active
            WHERE role_menus.role_id = ANY($1)
            "#,
        )
        .bind(role_uuids(role_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(read_error("load role menus"))?;

        rows.into_iter()
            .map(|row| {
                Ok(RoleMenuEntry {
                    role_id: RoleId::from_uuid(row.role_id),
                    methods: MethodAccess::parse(&row.access),
                    menu: row.menu.into_menu()?,
                })
            })
            .collect()
    }
}
