use serde_json::json;
use tenura_core::PermissionId;
use tenura_domain::{PermissionDefinition, PermissionMutableUpdate};
use tracing::info;

use super::*;

use crate::CreatePermissionInput;

impl SecurityAdminService {
    /// Lists the permission catalogue.
    pub async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>> {
        self.repository.list_permissions().await
    }

    /// Adds a permission to the catalogue. Names are unique.
    pub async fn create_permission(
        &self,
        actor: &UserIdentity,
        input: CreatePermissionInput,
    ) -> AppResult<PermissionDefinition> {
        self.scope_resolver
            .resolve(actor)
            .await
            .require_system("creating permissions")?;

        let permission = PermissionDefinition::new(
            PermissionId::new(),
            input.name,
            input.service,
            input.resource,
            input.action,
            true,
            input.is_high_risk,
            input.description,
        )?;
        self.repository.create_permission(&permission).await?;

        self.record(
            actor,
            AuditAction::PermissionCreated,
            "permission",
            permission.id().to_string(),
            json!({ "name": permission.name(), "is_high_risk": permission.is_high_risk() }),
        )
        .await?;

        Ok(permission)
    }

    /// Updates the mutable fields of a permission.
    ///
    /// Toggling the active flag changes the access of every role holding the
    /// permission, so all of their cache entries are invalidated.
    pub async fn update_permission(
        &self,
        actor: &UserIdentity,
        permission_id: PermissionId,
        update: PermissionMutableUpdate,
    ) -> AppResult<PermissionDefinition> {
        self.scope_resolver
            .resolve(actor)
            .await
            .require_system("updating permissions")?;
        update.ensure_not_empty()?;

        let existing = self
            .repository
            .find_permission(permission_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("permission '{permission_id}' does not exist"))
            })?;
        let updated = existing.apply_update(&update)?;

        let affected_roles = self
            .repository
            .list_roles_granted_permission(permission_id)
            .await?;
        self.permission_cache
            .invalidating(&affected_roles, self.repository.update_permission(&updated))
            .await?;

        info!(
            permission = updated.name(),
            affected_roles = affected_roles.len(),
            "permission updated"
        );

        self.record(
            actor,
            AuditAction::PermissionUpdated,
            "permission",
            permission_id.to_string(),
            json!({
                "name": updated.name(),
                "is_active": updated.is_active(),
                "is_high_risk": updated.is_high_risk(),
            }),
        )
        .await?;

        Ok(updated)
    }
}
