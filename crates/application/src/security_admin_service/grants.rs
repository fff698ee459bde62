use std::collections::{BTreeMap, BTreeSet};

use serde_json::json;
use tenura_core::{MenuId, PermissionId};
use tenura_domain::{MethodAccess, PermissionDefinition, RoleMenuGrant};
use tracing::info;

use super::*;

use crate::RoleMenuMapping;

impl SecurityAdminService {
    /// Lists the permissions granted to a role.
    pub async fn list_role_permissions(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
    ) -> AppResult<Vec<PermissionDefinition>> {
        self.visible_role(actor, role_id).await?;
        self.repository.list_role_permissions(role_id).await
    }

    /// Replaces a role's permission set.
    ///
    /// The replacement is all-or-nothing in storage, and the role's cache
    /// entry is invalidated around it.
    pub async fn assign_role_permissions(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
        permission_ids: Vec<PermissionId>,
    ) -> AppResult<()> {
        let permission_ids: Vec<PermissionId> = permission_ids
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if permission_ids.is_empty() {
            return Err(AppError::Validation(
                "permission_ids must not be empty".to_owned(),
            ));
        }

        self.visible_role(actor, role_id).await?;

        self.permission_cache
            .invalidating(
                &[role_id],
                self.repository
                    .replace_role_permissions(role_id, &permission_ids),
            )
            .await?;

        info!(%role_id, permissions = permission_ids.len(), "role permissions replaced");

        self.record(
            actor,
            AuditAction::RolePermissionsReplaced,
            "role",
            role_id.to_string(),
            json!({
                "permission_ids": permission_ids
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>(),
            }),
        )
        .await
    }

    /// Lists the menus mapped to a role.
    pub async fn list_role_menus(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
    ) -> AppResult<Vec<RoleMenuMapping>> {
        self.visible_role(actor, role_id).await?;
        self.repository.list_role_menus(role_id).await
    }

    /// Replaces a role's menu mappings. Repeated menus are merged. An empty
    /// list removes every mapping.
    pub async fn assign_role_menus(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
        grants: Vec<RoleMenuGrant>,
    ) -> AppResult<()> {
        let mut merged: BTreeMap<MenuId, MethodAccess> = BTreeMap::new();
        for grant in grants {
            merged.entry(grant.menu_id).or_default().merge(&grant.methods);
        }
        let grants: Vec<RoleMenuGrant> = merged
            .into_iter()
            .map(|(menu_id, methods)| RoleMenuGrant { menu_id, methods })
            .collect();

        self.visible_role(actor, role_id).await?;

        self.permission_cache
            .invalidating(
                &[role_id],
                self.repository.replace_role_menus(role_id, &grants),
            )
            .await?;

        info!(%role_id, menus = grants.len(), "role menus replaced");

        self.record(
            actor,
            AuditAction::RoleMenusReplaced,
            "role",
            role_id.to_string(),
            json!({
                "menus": grants
                    .iter()
                    .map(|grant| json!({
                        "menu_id": grant.menu_id.to_string(),
                        "access": grant.methods.to_access_string(),
                    }))
                    .collect::<Vec<_>>(),
            }),
        )
        .await
    }
}
