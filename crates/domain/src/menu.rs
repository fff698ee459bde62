use serde::{Deserialize, Serialize};
use tenura_core::{AppError, AppResult, MenuId, NonEmptyString};

use crate::MethodAccess;

/// Navigable UI route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuDefinition {
    id: MenuId,
    menu_key: NonEmptyString,
    name: NonEmptyString,
    route: NonEmptyString,
    icon: String,
    parent_id: Option<MenuId>,
    sort_order: i32,
    feature_key: Option<String>,
    is_active: bool,
}

impl MenuDefinition {
    /// Creates a menu definition.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: MenuId,
        menu_key: impl Into<String>,
        name: impl Into<String>,
        route: impl Into<String>,
        icon: impl Into<String>,
        parent_id: Option<MenuId>,
        sort_order: i32,
        feature_key: Option<String>,
        is_active: bool,
    ) -> AppResult<Self> {
        if parent_id == Some(id) {
            return Err(AppError::Validation(
                "menu cannot be its own parent".to_owned(),
            ));
        }

        Ok(Self {
            id,
            menu_key: NonEmptyString::for_field("menu_key", menu_key)?,
            name: NonEmptyString::for_field("name", name)?,
            route: NonEmptyString::for_field("route", route)?,
            icon: icon.into(),
            parent_id,
            sort_order,
            feature_key: feature_key
                .map(|key| key.trim().to_owned())
                .filter(|key| !key.is_empty()),
            is_active,
        })
    }

    /// Returns the menu id.
    #[must_use]
    pub fn id(&self) -> MenuId {
        self.id
    }

    /// Returns the unique menu key.
    #[must_use]
    pub fn menu_key(&self) -> &str {
        self.menu_key.as_str()
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the client route.
    #[must_use]
    pub fn route(&self) -> &str {
        self.route.as_str()
    }

    /// Returns the icon name.
    #[must_use]
    pub fn icon(&self) -> &str {
        self.icon.as_str()
    }

    /// Returns the parent menu.
    #[must_use]
    pub fn parent_id(&self) -> Option<MenuId> {
        self.parent_id
    }

    /// Returns the sort order.
    #[must_use]
    pub fn sort_order(&self) -> i32 {
        self.sort_order
    }

    /// Returns the gating feature key.
    #[must_use]
    pub fn feature_key(&self) -> Option<&str> {
        self.feature_key.as_deref()
    }

    /// Returns whether the menu is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Menu mapped onto a role together with the allowed methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMenuGrant {
    /// Mapped menu.
    pub menu_id: MenuId,
    /// Allowed HTTP methods.
    pub methods: MethodAccess,
}

impl RoleMenuGrant {
    /// Creates a grant, rejecting an empty method list.
    pub fn new(menu_id: MenuId, access: &str) -> AppResult<Self> {
        let methods = MethodAccess::parse(access);
        if methods.is_empty() {
            return Err(AppError::Validation(format!(
                "menu '{menu_id}' must allow at least one method"
            )));
        }

        Ok(Self { menu_id, methods })
    }
}
