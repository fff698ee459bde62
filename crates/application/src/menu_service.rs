use std::sync::Arc;

use async_trait::async_trait;

use tenura_core::{AppError, AppResult, MenuId, RoleId, UserIdentity};
use tenura_domain::MenuDefinition;

use crate::{PermissionCache, ScopeResolver};


/// Input payload for creating or updating a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveMenuInput {
    /// Unique key.
    pub menu_key: String,
    /// Display name.
    pub name: String,
    /// Client route.
    pub route: String,
    /// Icon name.
    pub icon: String,
    /// Parent menu.
    pub parent_id: Option<MenuId>,
    /// Sort order.
    pub sort_order: i32,
    /// Gating feature key.
    pub feature_key: Option<String>,
    /// Active flag.
    pub is_active: bool,
}

/// Repository port for menus.
#[async_trait]
pub trait MenuRepository: Send + Sync {
    /// Lists menus ordered by sort order.
    async fn list_menus(&self) -> AppResult<Vec<MenuDefinition>>;

    /// Finds a menu.
    async fn find_menu(&self, menu_id: MenuId) -> AppResult<Option<MenuDefinition>>;

    /// Inserts a menu. Duplicate keys are a conflict.
    async fn create_menu(&self, menu: &MenuDefinition) -> AppResult<()>;

    /// Updates a menu.
    async fn update_menu(&self, menu: &MenuDefinition) -> AppResult<()>;

    /// Deletes a menu with its role mappings.
    async fn delete_menu(&self, menu_id: MenuId) -> AppResult<()>;

    /// Lists roles mapped to a menu.
    async fn list_roles_for_menu(&self, menu_id: MenuId) -> AppResult<Vec<RoleId>>;
}

/// Menu catalogue administration. Mutations need system scope.
#[derive(Clone)]
pub struct MenuService {
    repository: Arc<dyn MenuRepository>,
    permission_cache: PermissionCache,
    scope_resolver: ScopeResolver,
}

impl MenuService {
    /// Creates a menu service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn MenuRepository>,
        permission_cache: PermissionCache,
        scope_resolver: ScopeResolver,
    ) -> Self {
        Self {
            repository,
            permission_cache,
            scope_resolver,
        }
    }

    /// Lists every menu.
    pub async fn list_menus(&self) -> AppResult<Vec<MenuDefinition>> {
        self.repository.list_menus().await
    }

    /// Creates a menu.
    pub async fn create_menu(
        &self,
        actor: &UserIdentity,
        input: SaveMenuInput,
    ) -> AppResult<MenuDefinition> {
        self.require_system(actor, "creating menus").await?;
        let menu = self.build_menu(MenuId::new(), input).await?;
        self.repository.create_menu(&menu).await?;
        Ok(menu)
    }

    /// Updates a menu. Roles mapped to it are invalidated, since the active
    /// flag feeds their access.
    pub async fn update_menu(
        &self,
        actor: &UserIdentity,
        menu_id: MenuId,
        input: SaveMenuInput,
    ) -> AppResult<MenuDefinition> {
        self.require_system(actor, "updating menus").await?;
        self.find_existing(menu_id).await?;
        let menu = self.build_menu(menu_id, input).await?;

        let affected_roles = self.repository.list_roles_for_menu(menu_id).await?;
        self.permission_cache
            .invalidating(&affected_roles, self.repository.update_menu(&menu))
            .await?;
        Ok(menu)
    }

    /// Deletes a menu and invalidates the roles that mapped it.
    pub async fn delete_menu(&self, actor: &UserIdentity, menu_id: MenuId) -> AppResult<()> {
        self.require_system(actor, "deleting menus").await?;
        self.find_existing(menu_id).await?;

        let affected_roles = self.repository.list_roles_for_menu(menu_id).await?;
        self.permission_cache
            .invalidating(&affected_roles, self.repository.delete_menu(menu_id))
            .await
    }

    async fn build_menu(&self, menu_id: MenuId, input: SaveMenuInput) -> AppResult<MenuDefinition> {
        if let Some(parent_id) = input.parent_id
            && parent_id != menu_id
        {
            self.find_existing(parent_id).await?;
        }

        MenuDefinition::new(
            menu_id,
            input.menu_key,
            input.name,
            input.route,
            input.icon,
            input.parent_id,
            input.sort_order,
            input.feature_key,
            input.is_active,
        )
    }

    async fn find_existing(&self, menu_id: MenuId) -> AppResult<MenuDefinition> {
        self.repository
            .find_menu(menu_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("menu '{menu_id}' does not exist")))
    }

    async fn require_system(&self, actor: &UserIdentity, operation: &str) -> AppResult<()> {
        self.scope_resolver
            .resolve(actor)
            .await
            .require_system(operation)
    }
}
