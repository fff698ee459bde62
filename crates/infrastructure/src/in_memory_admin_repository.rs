use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use tenura_application::{
    AuthorizationRepository, LoginAccount, LoginRepository, RoleMenuAccess, RoleMenuEntry,
    RolePermissionName,
};
use tenura_core::{
    AppError, AppResult, FeatureId, InstitutionId, MenuId, PermissionId, RoleId, UserId,
};
use tenura_domain::{
    FeatureDefinition, Institution, MenuDefinition, PermissionDefinition, Role, RoleMenuGrant,
    UserAccount,
};

mod audit;
mod catalogue;
mod directory;
mod security;

#[derive(Debug, Default)]
struct AdminState {
    institutions: HashMap<InstitutionId, Institution>,
    roles: HashMap<RoleId, Role>,
    permissions: HashMap<PermissionId, PermissionDefinition>,
    role_permissions: HashMap<RoleId, Vec<PermissionId>>,
    menus: HashMap<MenuId, MenuDefinition>,
    role_menus: HashMap<RoleId, Vec<RoleMenuGrant>>,
    users: HashMap<UserId, StoredUser>,
    features: HashMap<FeatureId, FeatureDefinition>,
    institution_features: BTreeMap<(InstitutionId, String), bool>,
    audit_events: Vec<tenura_application::AuditLogEntry>,
}

#[derive(Debug, Clone)]
struct StoredUser {
    account: UserAccount,
    password_hash: String,
    memberships: BTreeMap<InstitutionId, Vec<RoleId>>,
}

impl AdminState {
    fn active_role(&self, role_id: &RoleId) -> bool {
        self.roles.get(role_id).is_some_and(Role::is_active)
    }

    fn active_grants<'a>(
        &'a self,
        role_ids: &'a [RoleId],
    ) -> impl Iterator<Item = (RoleId, &'a MenuDefinition, &'a RoleMenuGrant)> + 'a {
        role_ids
            .iter()
            .filter(|role_id| self.active_role(role_id))
            .flat_map(move |role_id| {
                self.role_menus
                    .get(role_id)
                    .into_iter()
                    .flatten()
                    .filter_map(move |grant| {
                        self.menus
                            .get(&grant.menu_id)
                            .filter(|menu| menu.is_active())
                            .map(|menu| (*role_id, menu, grant))
                    })
            })
    }
}

/// In-memory implementation of every storage port, holding all state behind
/// one lock so multi-row replacements are atomic.
#[derive(Debug, Default)]
pub struct InMemoryAdminRepository {
    state: RwLock<AdminState>,
}

impl InMemoryAdminRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryAdminRepository {
    async fn list_permission_names_for_roles(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<RolePermissionName>> {
        let state = self.state.read().await;
        Ok(role_ids
            .iter()
            .filter(|role_id| state.active_role(role_id))
            .flat_map(|role_id| {
                state
                    .role_permissions
                    .get(role_id)
                    .into_iter()
                    .flatten()
                    .filter_map(|permission_id| state.permissions.get(permission_id))
                    .filter(|permission| permission.is_active())
                    .map(move |permission| RolePermissionName {
                        role_id: *role_id,
                        permission_name: permission.name().to_owned(),
                    })
            })
            .collect())
    }

    async fn list_menu_access_for_roles(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<RoleMenuAccess>> {
        let state = self.state.read().await;
        Ok(state
            .active_grants(role_ids)
            .map(|(role_id, menu, grant)| RoleMenuAccess {
                role_id,
                menu_id: menu.id(),
                methods: grant.methods.clone(),
            })
            .collect())
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.state.read().await.roles.get(&role_id).cloned())
    }
}

#[async_trait]
impl LoginRepository for InMemoryAdminRepository {
    async fn find_login_account(
        &self,
        username: &str,
        institution_id: InstitutionId,
    ) -> AppResult<Option<LoginAccount>> {
        let state = self.state.read().await;
        let Some(institution) = state
            .institutions
            .get(&institution_id)
            .filter(|institution| institution.is_active())
        else {
            return Ok(None);
        };

        Ok(state
            .users
            .values()
            .find(|user| user.account.username() == username)
            .and_then(|user| {
                let role_ids = user.memberships.get(&institution_id)?;
                Some(LoginAccount {
                    user_id: user.account.id(),
                    username: user.account.username().to_owned(),
                    full_name: user.account.full_name().to_owned(),
                    short_name: user.account.short_name().to_owned(),
                    password_hash: user.password_hash.clone(),
                    is_active: user.account.is_active(),
                    institution_id,
                    institution_name: institution.name().to_owned(),
                    role_ids: role_ids.clone(),
                })
            }))
    }

    async fn list_menus_for_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<RoleMenuEntry>> {
        let state = self.state.read().await;
        Ok(state
            .active_grants(role_ids)
            .map(|(role_id, menu, grant)| RoleMenuEntry {
                role_id,
                menu: menu.clone(),
                methods: grant.methods.clone(),
            })
            .collect())
    }
}

fn not_found(kind: &str, id: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("{kind} '{id}' does not exist"))
}
