use serde_json::json;
use tenura_core::InstitutionId;
use tenura_domain::RoleScope;

use super::*;

use crate::{AuditLogEntry, AuditLogQuery, CreateRoleInput, UpdateRoleInput};

const MAX_AUDIT_ENTRIES: usize = 500;

impl SecurityAdminService {
    /// Lists roles visible to the caller.
    pub async fn list_roles(&self, actor: &UserIdentity) -> AppResult<Vec<Role>> {
        let scope = self.scope_resolver.resolve(actor).await;
        self.repository.list_roles(scope.list_filter()?).await
    }

    /// Returns one role visible to the caller.
    pub async fn get_role(&self, actor: &UserIdentity, role_id: RoleId) -> AppResult<Role> {
        let (role, _) = self.visible_role(actor, role_id).await?;
        Ok(role)
    }

    /// Creates a role. System roles need system scope; institution roles
    /// must belong to an institution the caller sees.
    pub async fn create_role(&self, actor: &UserIdentity, input: CreateRoleInput) -> AppResult<Role> {
        let scope = self.scope_resolver.resolve(actor).await;
        match (input.scope, input.institution_id) {
            (RoleScope::System, _) => scope.require_system("creating system roles")?,
            (RoleScope::Institution, Some(institution_id)) => {
                scope.ensure_institution(institution_id)?;
            }
            (RoleScope::Institution, None) => {}
        }

        let role = Role::new(
            RoleId::new(),
            input.name,
            input.description,
            input.scope,
            input.institution_id,
            true,
            input.is_administrator,
        )?;
        self.repository.create_role(&role).await?;

        self.record(
            actor,
            AuditAction::RoleCreated,
            "role",
            role.id().to_string(),
            json!({
                "name": role.name(),
                "scope": role.scope().as_str(),
                "institution_id": role.institution_id().map(|id| id.to_string()),
            }),
        )
        .await?;

        Ok(role)
    }

    /// Updates a role's name, description and flags. Deactivating a role
    /// withdraws its access, so the role's cache entry is invalidated.
    pub async fn update_role(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
        input: UpdateRoleInput,
    ) -> AppResult<Role> {
        let (existing, _) = self.visible_role(actor, role_id).await?;
        let updated = Role::new(
            existing.id(),
            input.name,
            input.description,
            existing.scope(),
            existing.institution_id(),
            input.is_active,
            input.is_administrator,
        )?;

        self.permission_cache
            .invalidating(&[role_id], self.repository.update_role(&updated))
            .await?;

        self.record(
            actor,
            AuditAction::RoleUpdated,
            "role",
            role_id.to_string(),
            json!({
                "name": updated.name(),
                "is_active": updated.is_active(),
                "is_administrator": updated.is_administrator(),
            }),
        )
        .await?;

        Ok(updated)
    }

    /// Lists recent audit entries visible to the caller.
    pub async fn list_audit_entries(
        &self,
        actor: &UserIdentity,
        limit: Option<usize>,
    ) -> AppResult<Vec<AuditLogEntry>> {
        let scope = self.scope_resolver.resolve(actor).await;
        let institution_id: Option<InstitutionId> = scope.list_filter()?;
        self.audit_repository
            .list_events(AuditLogQuery {
                institution_id,
                limit: limit.unwrap_or(100).clamp(1, MAX_AUDIT_ENTRIES),
            })
            .await
    }
}
