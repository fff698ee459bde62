use std::sync::Arc;

use serde_json::Value;

use tenura_core::{AppError, AppResult, RoleId, UserIdentity};
use tenura_domain::{AuditAction, Role};

use crate::{
    AuditEvent, AuditRepository, CallerScope, PermissionCache, ScopeResolver,
    SecurityAdminRepository,
};

mod grants;
mod permissions;
mod roles;
#[cfg(test)]
mod tests;

/// Application service for roles, permissions and their grants.
///
/// Every write that changes a role's effective access goes through
/// [`PermissionCache::invalidating`].
#[derive(Clone)]
pub struct SecurityAdminService {
    repository: Arc<dyn SecurityAdminRepository>,
    permission_cache: PermissionCache,
    scope_resolver: ScopeResolver,
    audit_repository: Arc<dyn AuditRepository>,
}

impl SecurityAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn SecurityAdminRepository>,
        permission_cache: PermissionCache,
        scope_resolver: ScopeResolver,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            repository,
            permission_cache,
            scope_resolver,
            audit_repository,
        }
    }

    async fn visible_role(&self, actor: &UserIdentity, role_id: RoleId) -> AppResult<(Role, CallerScope)> {
        let scope = self.scope_resolver.resolve(actor).await;
        let role = self
            .repository
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;

        match role.institution_id() {
            Some(institution_id) => scope.ensure_institution(institution_id)?,
            None => scope.require_system("managing system roles")?,
        }

        Ok((role, scope))
    }

    async fn record(
        &self,
        actor: &UserIdentity,
        action: AuditAction,
        resource_type: &str,
        resource_id: String,
        detail: Value,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                actor_user_id: actor.user_id(),
                institution_id: actor.institution_id(),
                action,
                resource_type: resource_type.to_owned(),
                resource_id,
                detail: Some(detail),
            })
            .await
    }
}
