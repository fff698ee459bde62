use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::Arc;

use tenura_core::{AppResult, RoleId};
use tenura_domain::AccessMap;
use tracing::{error, warn};

use crate::{AccessCache, AuthorizationRepository};

#[cfg(test)]
mod tests;

/// Access map resolved for a role set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAccess {
    /// Union of the roles' access.
    pub access: AccessMap,
    /// True when every role was served from the cache.
    pub from_cache: bool,
}

/// Memoizes per-role access maps in front of storage.
///
/// A role set is resolved as the union of its members' entries, so the
/// result does not depend on role order or duplicates.
#[derive(Clone)]
pub struct PermissionCache {
    repository: Arc<dyn AuthorizationRepository>,
    cache: Arc<dyn AccessCache>,
}

impl PermissionCache {
    /// Creates a permission cache over a repository and cache backend.
    #[must_use]
    pub fn new(repository: Arc<dyn AuthorizationRepository>, cache: Arc<dyn AccessCache>) -> Self {
        Self { repository, cache }
    }

    /// Resolves the effective access of a role set.
    ///
    /// Cache read and write failures fall back to storage. Storage failures
    /// are returned to the caller.
    pub async fn resolve(&self, role_ids: &[RoleId]) -> AppResult<ResolvedAccess> {
        let unique_role_ids: BTreeSet<RoleId> = role_ids.iter().copied().collect();
        if unique_role_ids.is_empty() {
            return Ok(ResolvedAccess {
                access: AccessMap::new(),
                from_cache: false,
            });
        }

        let mut per_role = BTreeMap::new();
        let mut missing = Vec::new();
        for role_id in unique_role_ids {
            match self.cache.get(role_id).await {
                Ok(Some(access)) => {
                    per_role.insert(role_id, access);
                }
                Ok(None) => missing.push(role_id),
                Err(error) => {
                    warn!(%role_id, %error, "access cache read failed, loading from storage");
                    missing.push(role_id);
                }
            }
        }

        let from_cache = missing.is_empty();
        if !from_cache {
            for (role_id, access) in self.load_from_storage(&missing).await? {
                if let Err(error) = self.cache.put(role_id, &access).await {
                    warn!(%role_id, %error, "access cache write failed");
                }
                per_role.insert(role_id, access);
            }
        }

        Ok(ResolvedAccess {
            access: AccessMap::union(per_role.values()),
            from_cache,
        })
    }

    /// Drops the cached entry of a role. Errors are returned so mutation
    /// paths can abort.
    pub async fn invalidate_role(&self, role_id: RoleId) -> AppResult<()> {
        self.cache.invalidate(role_id).await
    }

    /// Drops the cached entries of several roles.
    pub async fn invalidate_roles(&self, role_ids: &[RoleId]) -> AppResult<()> {
        for role_id in role_ids {
            self.invalidate_role(*role_id).await?;
        }

        Ok(())
    }

    /// Runs a storage write that changes the access of `role_ids`.
    ///
    /// The entries are dropped before the write, so a failed invalidation
    /// aborts it untouched, and again after it, which drops entries that a
    /// concurrent miss repopulated while the write was in flight.
    pub async fn invalidating<T>(
        &self,
        role_ids: &[RoleId],
        write: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        self.invalidate_roles(role_ids).await?;
        let output = write.await?;
        if let Err(invalidation_error) = self.invalidate_roles(role_ids).await {
            error!(%invalidation_error, "access cache invalidation failed after write");
            return Err(invalidation_error);
        }

        Ok(output)
    }

    async fn load_from_storage(&self, role_ids: &[RoleId]) -> AppResult<BTreeMap<RoleId, AccessMap>> {
        let mut per_role: BTreeMap<RoleId, AccessMap> = role_ids
            .iter()
            .map(|role_id| (*role_id, AccessMap::new()))
            .collect();

        for grant in self
            .repository
            .list_permission_names_for_roles(role_ids)
            .await?
        {
            if let Some(access) = per_role.get_mut(&grant.role_id) {
                access.grant_permission(grant.permission_name);
            }
        }

        for grant in self.repository.list_menu_access_for_roles(role_ids).await? {
            if let Some(access) = per_role.get_mut(&grant.role_id) {
                access.grant_menu(grant.menu_id, &grant.methods);
            }
        }

        Ok(per_role)
    }
}
