use serde::{Deserialize, Serialize};
use tenura_core::{AppError, AppResult, NonEmptyString, PermissionId};

/// Named capability assignable to roles.
///
/// Name, service, resource and action are fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDefinition {
    id: PermissionId,
    name: NonEmptyString,
    service: NonEmptyString,
    resource: NonEmptyString,
    action: NonEmptyString,
    is_active: bool,
    is_high_risk: bool,
    description: String,
}

impl PermissionDefinition {
    /// Creates a permission definition.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: PermissionId,
        name: impl Into<String>,
        service: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
        is_active: bool,
        is_high_risk: bool,
        description: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::for_field("name", name)?,
            service: NonEmptyString::for_field("service", service)?,
            resource: NonEmptyString::for_field("resource", resource)?,
            action: NonEmptyString::for_field("action", action)?,
            is_active,
            is_high_risk,
            description: description.into().trim().to_owned(),
        })
    }

    /// Returns the permission id.
    #[must_use]
    pub fn id(&self) -> PermissionId {
        self.id
    }

    /// Returns the globally unique permission name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the owning service.
    #[must_use]
    pub fn service(&self) -> &str {
        self.service.as_str()
    }

    /// Returns the resource part of the capability.
    #[must_use]
    pub fn resource(&self) -> &str {
        self.resource.as_str()
    }

    /// Returns the action part of the capability.
    #[must_use]
    pub fn action(&self) -> &str {
        self.action.as_str()
    }

    /// Returns whether the permission is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns whether the permission is flagged high-risk.
    #[must_use]
    pub fn is_high_risk(&self) -> bool {
        self.is_high_risk
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Applies a mutable-field update and returns the updated definition.
    pub fn apply_update(&self, update: &PermissionMutableUpdate) -> AppResult<Self> {
        update.ensure_not_empty()?;

        let mut updated = self.clone();
        if let Some(is_active) = update.is_active {
            updated.is_active = is_active;
        }
        if let Some(is_high_risk) = update.is_high_risk {
            updated.is_high_risk = is_high_risk;
        }
        if let Some(description) = &update.description {
            updated.description = description.trim().to_owned();
        }

        Ok(updated)
    }
}

/// Fields of a permission that may change after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionMutableUpdate {
    /// New active flag.
    pub is_active: Option<bool>,
    /// New high-risk flag.
    pub is_high_risk: Option<bool>,
    /// New description.
    pub description: Option<String>,
}

impl PermissionMutableUpdate {
    /// Rejects updates that carry no field.
    pub fn ensure_not_empty(&self) -> AppResult<()> {
        if self.is_active.is_none() && self.is_high_risk.is_none() && self.description.is_none() {
            return Err(AppError::Validation(
                "no updatable fields provided".to_owned(),
            ));
        }

        Ok(())
    }
}
