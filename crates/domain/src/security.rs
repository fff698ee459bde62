use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tenura_core::{AppError, AppResult, InstitutionId, NonEmptyString, RoleId};

/// Visibility granted by a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleScope {
    /// Rows across every institution.
    System,
    /// Rows of the caller's bound institution only.
    Institution,
}

impl RoleScope {
    /// Returns a stable storage value for this scope.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Institution => "institution",
        }
    }
}

impl FromStr for RoleScope {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "system" => Ok(Self::System),
            "institution" => Ok(Self::Institution),
            _ => Err(AppError::Validation(format!(
                "unknown role scope '{value}'"
            ))),
        }
    }
}

/// Role definition with its scope binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    name: NonEmptyString,
    description: String,
    scope: RoleScope,
    institution_id: Option<InstitutionId>,
    is_active: bool,
    is_administrator: bool,
}

impl Role {
    /// Creates a role, enforcing that `system` roles carry no institution and
    /// `institution` roles carry exactly one.
    pub fn new(
        id: RoleId,
        name: impl Into<String>,
        description: impl Into<String>,
        scope: RoleScope,
        institution_id: Option<InstitutionId>,
        is_active: bool,
        is_administrator: bool,
    ) -> AppResult<Self> {
        match (scope, institution_id) {
            (RoleScope::System, Some(_)) => {
                return Err(AppError::Validation(
                    "system roles must not reference an institution".to_owned(),
                ));
            }
            (RoleScope::Institution, None) => {
                return Err(AppError::Validation(
                    "institution roles must reference an institution".to_owned(),
                ));
            }
            _ => {}
        }

        Ok(Self {
            id,
            name: NonEmptyString::for_field("name", name)?,
            description: description.into().trim().to_owned(),
            scope,
            institution_id,
            is_active,
            is_administrator,
        })
    }

    /// Returns the role id.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the role description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the role scope.
    #[must_use]
    pub fn scope(&self) -> RoleScope {
        self.scope
    }

    /// Returns the owning institution, `None` for system roles.
    #[must_use]
    pub fn institution_id(&self) -> Option<InstitutionId> {
        self.institution_id
    }

    /// Returns whether the role is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns whether the role is flagged as administrator.
    #[must_use]
    pub fn is_administrator(&self) -> bool {
        self.is_administrator
    }

    /// Returns whether the role grants system-wide visibility.
    #[must_use]
    pub fn grants_system_scope(&self) -> bool {
        self.is_active && self.scope == RoleScope::System
    }
}

/// Permissions required by the administrative routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoutePermission {
    /// List and read users.
    UserRead,
    /// Create users.
    UserCreate,
    /// Update users.
    UserUpdate,
    /// Delete users.
    UserDelete,
    /// List and read roles and their grants.
    RoleRead,
    /// Create roles.
    RoleCreate,
    /// Update roles.
    RoleUpdate,
    /// Replace a role's permission set.
    RoleAssignPermission,
    /// Replace a role's menu mappings.
    RoleAssignMenu,
    /// List permissions.
    PermissionRead,
    /// Create permissions.
    PermissionCreate,
    /// Update mutable permission fields.
    PermissionUpdate,
    /// List menus.
    MenuRead,
    /// Create menus.
    MenuCreate,
    /// Update menus.
    MenuUpdate,
    /// Delete menus.
    MenuDelete,
    /// List and read institutions.
    InstitutionRead,
    /// Create institutions.
    InstitutionCreate,
    /// Update institutions.
    InstitutionUpdate,
    /// Delete institutions.
    InstitutionDelete,
    /// List features and institution overrides.
    FeatureRead,
    /// Create features.
    FeatureCreate,
    /// Update features.
    FeatureUpdate,
    /// Set institution feature overrides.
    FeatureAssign,
    /// Read the audit trail.
    AuditRead,
}

impl RoutePermission {
    /// Returns the permission name as stored in the permission table.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserRead => "user.read",
            Self::UserCreate => "user.create",
            Self::UserUpdate => "user.update",
            Self::UserDelete => "user.delete",
            Self::RoleRead => "role.read",
            Self::RoleCreate => "role.create",
            Self::RoleUpdate => "role.update",
            Self::RoleAssignPermission => "role.assign_permission",
            Self::RoleAssignMenu => "role.assign_menu",
            Self::PermissionRead => "permission.read",
            Self::PermissionCreate => "permission.create",
            Self::PermissionUpdate => "permission.update",
            Self::MenuRead => "menu.read",
            Self::MenuCreate => "menu.create",
            Self::MenuUpdate => "menu.update",
            Self::MenuDelete => "menu.delete",
            Self::InstitutionRead => "institution.read",
            Self::InstitutionCreate => "institution.create",
            Self::InstitutionUpdate => "institution.update",
            Self::InstitutionDelete => "institution.delete",
            Self::FeatureRead => "feature.read",
            Self::FeatureCreate => "feature.create",
            Self::FeatureUpdate => "feature.update",
            Self::FeatureAssign => "feature.assign",
            Self::AuditRead => "audit.read",
        }
    }

    /// Returns the resource and action halves of the name.
    #[must_use]
    pub fn resource_and_action(&self) -> (&'static str, &'static str) {
        self.as_str().split_once('.').unwrap_or((self.as_str(), ""))
    }

    /// Returns every route permission.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[RoutePermission] = &[
            RoutePermission::UserRead,
            RoutePermission::UserCreate,
            RoutePermission::UserUpdate,
            RoutePermission::UserDelete,
            RoutePermission::RoleRead,
            RoutePermission::RoleCreate,
            RoutePermission::RoleUpdate,
            RoutePermission::RoleAssignPermission,
            RoutePermission::RoleAssignMenu,
            RoutePermission::PermissionRead,
            RoutePermission::PermissionCreate,
            RoutePermission::PermissionUpdate,
            RoutePermission::MenuRead,
            RoutePermission::MenuCreate,
            RoutePermission::MenuUpdate,
            RoutePermission::MenuDelete,
            RoutePermission::InstitutionRead,
            RoutePermission::InstitutionCreate,
            RoutePermission::InstitutionUpdate,
            RoutePermission::InstitutionDelete,
            RoutePermission::FeatureRead,
            RoutePermission::FeatureCreate,
            RoutePermission::FeatureUpdate,
            RoutePermission::FeatureAssign,
            RoutePermission::AuditRead,
        ];

        ALL
    }
}

impl FromStr for RoutePermission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|permission| permission.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown route permission '{value}'")))
    }
}

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A role was created.
    RoleCreated,
    /// A role was updated.
    RoleUpdated,
    /// A role's permission set was replaced.
    RolePermissionsReplaced,
    /// A role's menu mappings were replaced.
    RoleMenusReplaced,
    /// A permission was created.
    PermissionCreated,
    /// A permission's mutable fields were updated.
    PermissionUpdated,
    /// A user was created.
    UserCreated,
    /// A user was updated.
    UserUpdated,
    /// A user was deleted.
    UserDeleted,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleCreated => "security.role.created",
            Self::RoleUpdated => "security.role.updated",
            Self::RolePermissionsReplaced => "security.role.permissions_replaced",
            Self::RoleMenusReplaced => "security.role.menus_replaced",
            Self::PermissionCreated => "security.permission.created",
            Self::PermissionUpdated => "security.permission.updated",
            Self::UserCreated => "user.created",
            Self::UserUpdated => "user.updated",
            Self::UserDeleted => "user.deleted",
        }
    }
}
