use chrono::{DateTime, Utc};

use tenura_core::{AppError, AppResult, MenuId, UserIdentity};
use tracing::debug;

use crate::{PermissionCache, TokenService};


/// Access a route demands from its caller.
///
/// With neither a permission nor a menu the route is open to any verified
/// identity. A named permission always decides; the legacy menu is only
/// consulted on routes that name no permission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessRequirement {
    permission: Option<String>,
    menu_id: Option<MenuId>,
}

impl AccessRequirement {
    /// Requirement of an identity-only route.
    #[must_use]
    pub fn open() -> Self {
        Self::default()
    }

    /// Requirement naming a permission.
    #[must_use]
    pub fn permission(name: impl Into<String>) -> Self {
        Self::open().with_permission(name)
    }

    /// Adds a permission name; blank names are ignored.
    #[must_use]
    pub fn with_permission(mut self, name: impl Into<String>) -> Self {
        let name = name.into().trim().to_owned();
        if !name.is_empty() {
            self.permission = Some(name);
        }
        self
    }

    /// Adds a legacy menu-route requirement, ignored once a permission is named.
    #[must_use]
    pub fn with_menu(mut self, menu_id: MenuId) -> Self {
        self.menu_id = Some(menu_id);
        self
    }

    /// Returns the required permission name.
    #[must_use]
    pub fn required_permission(&self) -> Option<&str> {
        self.permission.as_deref()
    }

    /// Returns the required menu.
    #[must_use]
    pub fn required_menu(&self) -> Option<MenuId> {
        self.menu_id
    }

    /// Returns whether only identity is checked.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.permission.is_none() && self.menu_id.is_none()
    }
}

/// Per-request admission decision.
///
/// Verifies the bearer token, resolves the caller's access and checks it
/// against the route requirement. Authentication failures are
/// `Unauthorized`, missing access is `Forbidden`, and resolution failures
/// propagate as errors so nothing is admitted.
#[derive(Clone)]
pub struct AuthorizationGate {
    tokens: TokenService,
    permissions: PermissionCache,
}

impl AuthorizationGate {
    /// Creates a gate from its token service and permission cache.
    #[must_use]
    pub fn new(tokens: TokenService, permissions: PermissionCache) -> Self {
        Self {
            tokens,
            permissions,
        }
    }

    /// Verifies the bearer token alone.
    pub fn authenticate(
        &self,
        bearer_token: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<UserIdentity> {
        let token = bearer_token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_owned()))?;
        self.tokens.verify(token, now)
    }

    /// Checks an already verified identity against the route requirement.
    pub async fn authorize(
        &self,
        identity: UserIdentity,
        requirement: &AccessRequirement,
        method: &str,
    ) -> AppResult<UserIdentity> {
        if requirement.is_open() {
            return Ok(identity);
        }

        if identity.role_ids().is_empty() {
            return Err(AppError::Forbidden("missing role assignment".to_owned()));
        }

        let resolved = self.permissions.resolve(identity.role_ids()).await?;
        let access = &resolved.access;

        let granted = match requirement.required_permission() {
            Some(permission) => access.has_permission(permission),
            None => requirement
                .required_menu()
                .is_some_and(|menu_id| access.allows_menu_method(menu_id, method)),
        };

        if granted {
            debug!(
                user_id = %identity.user_id(),
                from_cache = resolved.from_cache,
                "request admitted"
            );
            return Ok(identity);
        }

        Err(AppError::Forbidden(match requirement.required_permission() {
            Some(permission) => format!("permission '{permission}' denied"),
            None => format!("method {method} denied on menu"),
        }))
    }
}
