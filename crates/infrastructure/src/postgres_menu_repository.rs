use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use tenura_application::MenuRepository;
use tenura_core::{AppResult, MenuId, RoleId};
use tenura_domain::MenuDefinition;

use crate::postgres_rows::{MenuRow, map_write_error, read_error};

/// PostgreSQL-backed repository for the menu catalogue.
#[derive(Clone)]
pub struct PostgresMenuRepository {
    pool: PgPool,
}

impl PostgresMenuRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MenuRepository for PostgresMenuRepository {
    async fn list_menus(&self) -> AppResult<Vec<MenuDefinition>> {
        let rows = sqlx::query_as::<_, MenuRow>(
            r#"
            SELECT id, menu_key, name, route, icon, parent_id, sort_order, feature_key, is_active
            FROM menus
            ORDER BY sort_order, name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(read_error("list menus"))?;

        rows.into_iter().map(MenuRow::into_menu).collect()
    }

    async fn find_menu(&self, menu_id: MenuId) -> AppResult<Option<MenuDefinition>> {
        sqlx::query_as::<_, MenuRow>(
            r#"
            SELECT id, menu_key, name, route, icon, parent_id, sort_order, feature_key, is_active
            FROM menus
            WHERE id = $1
            "#,
        )
        .bind(menu_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(read_error("find menu"))?
        .map(MenuRow::into_menu)
        .transpose()
    }

    async fn create_menu(&self, menu: &MenuDefinition) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO menus (
                id, menu_key, name, route, icon, parent_id, sort_order, feature_key, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(menu.id().as_uuid())
        .bind(menu.menu_key())
        .bind(menu.name())
        .bind(menu.route())
        .bind(menu.icon())
        .bind(menu.parent_id().map(|id| id.as_uuid()))
        .bind(menu.sort_order())
        .bind(menu.feature_key())
        .bind(menu.is_active())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_write_error(
                error,
                "create menu",
                format!("menu '{}' already exists", menu.menu_key()),
            )
        })?;

        Ok(())
    }

    async fn update_menu(&self, menu: &MenuDefinition) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE menus
            SET menu_key = $2,
                name = $3,
                route = $4,
                icon = $5,
                parent_id = $6,
                sort_order = $7,
                feature_key = $8,
                is_active = $9,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(menu.id().as_uuid())
        .bind(menu.menu_key())
        .bind(menu.name())
        .bind(menu.route())
        .bind(menu.icon())
        .bind(menu.parent_id().map(|id| id.as_uuid()))
        .bind(menu.sort_order())
        .bind(menu.feature_key())
        .bind(menu.is_active())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_write_error(
                error,
                "update menu",
                format!("menu '{}' already exists", menu.menu_key()),
            )
        })?;

        Ok(())
    }

    async fn delete_menu(&self, menu_id: MenuId) -> AppResult<()> {
        sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(menu_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(read_error("delete menu"))?;

        Ok(())
    }

    async fn list_roles_for_menu(&self, menu_id: MenuId) -> AppResult<Vec<RoleId>> {
        let role_ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT role_id
            FROM role_menus
            WHERE menu_id = $1
            "#,
        )
        .bind(menu_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(read_error("list roles for menu"))?;

        Ok(role_ids.into_iter().map(RoleId::from_uuid).collect())
    }
}
