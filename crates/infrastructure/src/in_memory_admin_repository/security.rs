use tenura_application::{RoleMenuMapping, SecurityAdminRepository};

use super::*;

#[async_trait]
impl SecurityAdminRepository for InMemoryAdminRepository {
    async fn list_roles(&self, institution_id: Option<InstitutionId>) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;
        let mut roles: Vec<Role> = state
            .roles
            .values()
            .filter(|role| institution_id.is_none() || role.institution_id() == institution_id)
            .cloned()
            .collect();
        roles.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(roles)
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.state.read().await.roles.get(&role_id).cloned())
    }

    async fn create_role(&self, role: &Role) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.roles.values().any(|existing| {
            existing.institution_id() == role.institution_id() && existing.name() == role.name()
        }) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name()
            )));
        }
        state.roles.insert(role.id(), role.clone());
        Ok(())
    }

    async fn update_role(&self, role: &Role) -> AppResult<()> {
        let mut state = self.state.write().await;
        let Some(existing) = state.roles.get_mut(&role.id()) else {
            return Err(not_found("role", role.id()));
        };
        *existing = role.clone();
        Ok(())
    }

    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>> {
        let state = self.state.read().await;
        let mut permissions: Vec<PermissionDefinition> =
            state.permissions.values().cloned().collect();
        permissions.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(permissions)
    }

    async fn find_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<PermissionDefinition>> {
        Ok(self
            .state
            .read()
            .await
            .permissions
            .get(&permission_id)
            .cloned())
    }

    async fn create_permission(&self, permission: &PermissionDefinition) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state
            .permissions
            .values()
            .any(|existing| existing.name() == permission.name())
        {
            return Err(AppError::Conflict(format!(
                "permission '{}' already exists",
                permission.name()
            )));
        }
        state
            .permissions
            .insert(permission.id(), permission.clone());
        Ok(())
    }

    async fn update_permission(&self, permission: &PermissionDefinition) -> AppResult<()> {
        let mut state = self.state.write().await;
        let Some(existing) = state.permissions.get_mut(&permission.id()) else {
            return Err(not_found("permission", permission.id()));
        };
        *existing = permission.clone();
        Ok(())
    }

    async fn list_roles_granted_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Vec<RoleId>> {
        Ok(self
            .state
            .read()
            .await
            .role_permissions
            .iter()
            .filter(|(_, permission_ids)| permission_ids.contains(&permission_id))
            .map(|(role_id, _)| *role_id)
            .collect())
    }

    async fn list_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<PermissionDefinition>> {
        let state = self.state.read().await;
        let mut permissions: Vec<PermissionDefinition> = state
            .role_permissions
            .get(&role_id)
            .into_iter()
            .flatten()
            .filter_map(|permission_id| state.permissions.get(permission_id).cloned())
            .collect();
        permissions.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(permissions)
    }

    async fn replace_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        if let Some(missing) = permission_ids
            .iter()
            .find(|permission_id| !state.permissions.contains_key(permission_id))
        {
            return Err(not_found("permission", missing));
        }
        state
            .role_permissions
            .insert(role_id, permission_ids.to_vec());
        Ok(())
    }

    async fn list_role_menus(&self, role_id: RoleId) -> AppResult<Vec<RoleMenuMapping>> {
        let state = self.state.read().await;
        let mut mappings: Vec<RoleMenuMapping> = state
            .role_menus
            .get(&role_id)
            .into_iter()
            .flatten()
            .filter_map(|grant| {
                state.menus.get(&grant.menu_id).map(|menu| RoleMenuMapping {
                    menu: menu.clone(),
                    methods: grant.methods.clone(),
                })
            })
            .collect();
        mappings.sort_by_key(|mapping| mapping.menu.sort_order());
        Ok(mappings)
    }

    async fn replace_role_menus(&self, role_id: RoleId, grants: &[RoleMenuGrant]) -> AppResult<()> {
        let mut state = self.state.write().await;
        if let Some(missing) = grants
            .iter()
            .find(|grant| !state.menus.contains_key(&grant.menu_id))
        {
            return Err(not_found("menu", missing.menu_id));
        }
        state.role_menus.insert(role_id, grants.to_vec());
        Ok(())
    }
}
