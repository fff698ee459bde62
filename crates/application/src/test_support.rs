//! In-process fakes shared by the service tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError};

use async_trait::async_trait;
use tokio::sync::Mutex;

use tenura_core::{
    AppError, AppResult, FeatureId, InstitutionId, MenuId, PermissionId, RoleId, UserId,
    UserIdentity,
};
use tenura_domain::{
    AccessMap, FeatureDefinition, Institution, InstitutionFeature, MenuDefinition, MethodAccess, PermissionDefinition, Role,
    RoleMenuGrant, RoleScope, UserAccount,
};

use crate::{
    AccessCache, AuditEvent, AuditLogEntry, AuditLogQuery, AuditRepository,
    AuthorizationRepository, FeatureRepository, InstitutionRepository, MenuRepository, LoginAccount, LoginRepository,
    PasswordHasher, PermissionCache, RoleMenuAccess, RoleMenuEntry, RoleMenuMapping,
    RolePermissionName, ScopeResolver, SecurityAdminRepository, SessionClaims, TokenCodec,
    UserMembership, UserRecord, UserRepository,
};

#[derive(Default)]
pub struct FakeTokenCodec {
    issued: std::sync::Mutex<HashMap<String, SessionClaims>>,
}

impl TokenCodec for FakeTokenCodec {
    fn encode(&self, claims: &SessionClaims) -> AppResult<String> {
        let mut issued = self.issued.lock().unwrap_or_else(PoisonError::into_inner);
        let token = format!("token-{}", issued.len() + 1);
        issued.insert(token.clone(), claims.clone());
        Ok(token)
    }

    fn decode(&self, token: &str) -> AppResult<SessionClaims> {
        self.issued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("invalid token".to_owned()))
    }
}

pub struct FakePasswordHasher;

impl PasswordHasher for FakePasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("hashed:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash == format!("hashed:{password}"))
    }
}

#[derive(Default)]
pub struct FakeAccessCache {
    pub entries: Mutex<HashMap<RoleId, AccessMap>>,
    pub fail_reads: AtomicBool,
    pub fail_invalidation: AtomicBool,
}

#[async_trait]
impl AccessCache for FakeAccessCache {
    async fn get(&self, role_id: RoleId) -> AppResult<Option<AccessMap>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Internal("cache unavailable".to_owned()));
        }
        Ok(self.entries.lock().await.get(&role_id).cloned())
    }

    async fn put(&self, role_id: RoleId, access: &AccessMap) -> AppResult<()> {
        self.entries.lock().await.insert(role_id, access.clone());
        Ok(())
    }

    async fn invalidate(&self, role_id: RoleId) -> AppResult<()> {
        if self.fail_invalidation.load(Ordering::SeqCst) {
            return Err(AppError::Internal("cache unavailable".to_owned()));
        }
        self.entries.lock().await.remove(&role_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeStore {
    pub roles: Mutex<HashMap<RoleId, Role>>,
    pub permissions: Mutex<HashMap<PermissionId, PermissionDefinition>>,
    pub role_permissions: Mutex<HashMap<RoleId, Vec<PermissionId>>>,
    pub menus: Mutex<HashMap<MenuId, MenuDefinition>>,
    pub role_menus: Mutex<HashMap<RoleId, Vec<RoleMenuGrant>>>,
    pub institutions: Mutex<HashMap<InstitutionId, Institution>>,
    pub users: Mutex<HashMap<UserId, (UserAccount, String)>>,
    pub memberships: Mutex<HashMap<UserId, Vec<(InstitutionId, Vec<RoleId>)>>>,
    pub features: Mutex<HashMap<FeatureId, FeatureDefinition>>,
    pub institution_features: Mutex<Vec<InstitutionFeature>>,
    pub audit_events: Mutex<Vec<AuditEvent>>,
    pub fail_storage: AtomicBool,
    pub abort_replacements: AtomicBool,
    pub access_reads: AtomicUsize,
}

impl FakeStore {
    fn check_available(&self) -> AppResult<()> {
        if self.fail_storage.load(Ordering::SeqCst) {
            return Err(AppError::Internal("storage unreachable".to_owned()));
        }
        Ok(())
    }

    pub async fn add_institution(&self, name: &str) -> InstitutionId {
        let institution_id = InstitutionId::new();
        let institution = Institution::new(
            institution_id,
            name,
            name.to_uppercase(),
            "",
            "",
            None,
            true,
        )
        .unwrap_or_else(|_| panic!("valid institution"));
        self.institutions
            .lock()
            .await
            .insert(institution_id, institution);
        institution_id
    }

    pub async fn add_role(
        &self,
        name: &str,
        scope: RoleScope,
        institution_id: Option<InstitutionId>,
    ) -> RoleId {
        let role_id = RoleId::new();
        let role = Role::new(role_id, name, "", scope, institution_id, true, false)
            .unwrap_or_else(|_| panic!("valid role"));
        self.roles.lock().await.insert(role_id, role);
        role_id
    }

    pub async fn add_permission(&self, name: &str) -> PermissionId {
        let permission_id = PermissionId::new();
        let (resource, action) = name.split_once('.').unwrap_or((name, "use"));
        let permission = PermissionDefinition::new(
            permission_id,
            name,
            "gateway",
            resource,
            action,
            true,
            false,
            "",
        )
        .unwrap_or_else(|_| panic!("valid permission"));
        self.permissions
            .lock()
            .await
            .insert(permission_id, permission);
        permission_id
    }

    pub async fn grant(&self, role_id: RoleId, permission_id: PermissionId) {
        self.role_permissions
            .lock()
            .await
            .entry(role_id)
            .or_default()
            .push(permission_id);
    }

    pub async fn add_menu(&self, key: &str, sort_order: i32) -> MenuId {
        let menu_id = MenuId::new();
        let menu = MenuDefinition::new(
            menu_id,
            key,
            key,
            format!("/{key}"),
            "",
            None,
            sort_order,
            None,
            true,
        )
        .unwrap_or_else(|_| panic!("valid menu"));
        self.menus.lock().await.insert(menu_id, menu);
        menu_id
    }

    pub async fn map_menu(&self, role_id: RoleId, menu_id: MenuId, access: &str) {
        self.role_menus
            .lock()
            .await
            .entry(role_id)
            .or_default()
            .push(RoleMenuGrant {
                menu_id,
                methods: MethodAccess::parse(access),
            });
    }

    pub async fn add_user(
        &self,
        username: &str,
        password: &str,
        institution_id: InstitutionId,
        role_ids: Vec<RoleId>,
    ) -> UserId {
        let user_id = UserId::new();
        let account = UserAccount::new(
            user_id,
            username,
            format!("{username}@example.com"),
            format!("{username} fullname"),
            username,
            true,
        )
        .unwrap_or_else(|_| panic!("valid account"));
        self.users
            .lock()
            .await
            .insert(user_id, (account, format!("hashed:{password}")));
        self.memberships
            .lock()
            .await
            .insert(user_id, vec![(institution_id, role_ids)]);
        user_id
    }

    pub async fn permission_names_of(&self, role_id: RoleId) -> Vec<String> {
        let permissions = self.permissions.lock().await;
        let mut names: Vec<String> = self
            .role_permissions
            .lock()
            .await
            .get(&role_id)
            .into_iter()
            .flatten()
            .filter_map(|permission_id| permissions.get(permission_id))
            .map(|permission| permission.name().to_owned())
            .collect();
        names.sort();
        names
    }

    async fn user_record(&self, user_id: UserId) -> Option<UserRecord> {
        let (account, _) = self.users.lock().await.get(&user_id).cloned()?;
        let institutions = self.institutions.lock().await;
        let memberships = self
            .memberships
            .lock()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|(institution_id, role_ids)| UserMembership {
                institution_id,
                institution_name: institutions
                    .get(&institution_id)
                    .map(|institution| institution.name().to_owned())
                    .unwrap_or_default(),
                role_ids,
            })
            .collect();
        Some(UserRecord {
            account,
            memberships,
        })
    }
}

#[async_trait]
impl AuthorizationRepository for FakeStore {
    async fn list_permission_names_for_roles(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<RolePermissionName>> {
        self.check_available()?;
        self.access_reads.fetch_add(1, Ordering::SeqCst);

        let roles = self.roles.lock().await;
        let permissions = self.permissions.lock().await;
        let grants = self.role_permissions.lock().await;
        let mut rows = Vec::new();
        for role_id in role_ids {
            if !roles.get(role_id).is_some_and(Role::is_active) {
                continue;
            }
            for permission_id in grants.get(role_id).into_iter().flatten() {
                if let Some(permission) = permissions.get(permission_id)
                    && permission.is_active()
                {
                    rows.push(RolePermissionName {
                        role_id: *role_id,
                        permission_name: permission.name().to_owned(),
                    });
                }
            }
        }
        Ok(rows)
    }

    async fn list_menu_access_for_roles(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<RoleMenuAccess>> {
        self.check_available()?;

        let roles = self.roles.lock().await;
        let menus = self.menus.lock().await;
        let grants = self.role_menus.lock().await;
        let mut rows = Vec::new();
        for role_id in role_ids {
            if !roles.get(role_id).is_some_and(Role::is_active) {
                continue;
            }
            for grant in grants.get(role_id).into_iter().flatten() {
                if menus.get(&grant.menu_id).is_some_and(MenuDefinition::is_active) {
                    rows.push(RoleMenuAccess {
                        role_id: *role_id,
                        menu_id: grant.menu_id,
                        methods: grant.methods.clone(),
                    });
                }
            }
        }
        Ok(rows)
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        self.check_available()?;
        Ok(self.roles.lock().await.get(&role_id).cloned())
    }
}

#[async_trait]
impl SecurityAdminRepository for FakeStore {
    async fn list_roles(&self, institution_id: Option<InstitutionId>) -> AppResult<Vec<Role>> {
        Ok(self
            .roles
            .lock()
            .await
            .values()
            .filter(|role| institution_id.is_none() || role.institution_id() == institution_id)
            .cloned()
            .collect())
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        AuthorizationRepository::find_role(self, role_id).await
    }

    async fn create_role(&self, role: &Role) -> AppResult<()> {
        self.roles.lock().await.insert(role.id(), role.clone());
        Ok(())
    }

    async fn update_role(&self, role: &Role) -> AppResult<()> {
        self.roles.lock().await.insert(role.id(), role.clone());
        Ok(())
    }

    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>> {
        Ok(self.permissions.lock().await.values().cloned().collect())
    }

    async fn find_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<PermissionDefinition>> {
        Ok(self.permissions.lock().await.get(&permission_id).cloned())
    }

    async fn create_permission(&self, permission: &PermissionDefinition) -> AppResult<()> {
        let mut permissions = self.permissions.lock().await;
        if permissions
            .values()
            .any(|existing| existing.name() == permission.name())
        {
            return Err(AppError::Conflict(format!(
                "permission '{}' already exists",
                permission.name()
            )));
        }
        permissions.insert(permission.id(), permission.clone());
        Ok(())
    }

    async fn update_permission(&self, permission: &PermissionDefinition) -> AppResult<()> {
        self.permissions
            .lock()
            .await
            .insert(permission.id(), permission.clone());
        Ok(())
    }

    async fn list_roles_granted_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Vec<RoleId>> {
        Ok(self
            .role_permissions
            .lock()
            .await
            .iter()
            .filter(|(_, permission_ids)| permission_ids.contains(&permission_id))
            .map(|(role_id, _)| *role_id)
            .collect())
    }

    async fn list_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<PermissionDefinition>> {
        let permissions = self.permissions.lock().await;
        Ok(self
            .role_permissions
            .lock()
            .await
            .get(&role_id)
            .into_iter()
            .flatten()
            .filter_map(|permission_id| permissions.get(permission_id).cloned())
            .collect())
    }

    async fn replace_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        self.check_available()?;
        let permissions = self.permissions.lock().await;
        if let Some(missing) = permission_ids
            .iter()
            .find(|permission_id| !permissions.contains_key(permission_id))
        {
            return Err(AppError::NotFound(format!(
                "permission '{missing}' does not exist"
            )));
        }
        if self.abort_replacements.load(Ordering::SeqCst) {
            return Err(AppError::Internal(
                "transaction aborted before commit".to_owned(),
            ));
        }

        self.role_permissions
            .lock()
            .await
            .insert(role_id, permission_ids.to_vec());
        Ok(())
    }

    async fn list_role_menus(&self, role_id: RoleId) -> AppResult<Vec<RoleMenuMapping>> {
        let menus = self.menus.lock().await;
        Ok(self
            .role_menus
            .lock()
            .await
            .get(&role_id)
            .into_iter()
            .flatten()
            .filter_map(|grant| {
                menus.get(&grant.menu_id).map(|menu| RoleMenuMapping {
                    menu: menu.clone(),
                    methods: grant.methods.clone(),
                })
            })
            .collect())
    }

    async fn replace_role_menus(&self, role_id: RoleId, grants: &[RoleMenuGrant]) -> AppResult<()> {
        self.check_available()?;
        self.role_menus.lock().await.insert(role_id, grants.to_vec());
        Ok(())
    }
}

#[async_trait]
impl LoginRepository for FakeStore {
    async fn find_login_account(
        &self,
        username: &str,
        institution_id: InstitutionId,
    ) -> AppResult<Option<LoginAccount>> {
        let users = self.users.lock().await;
        let Some((account, password_hash)) = users
            .values()
            .find(|(account, _)| account.username() == username)
        else {
            return Ok(None);
        };
        let memberships = self.memberships.lock().await;
        let Some((_, role_ids)) = memberships
            .get(&account.id())
            .into_iter()
            .flatten()
            .find(|(member_of, _)| *member_of == institution_id)
        else {
            return Ok(None);
        };
        let institution_name = self
            .institutions
            .lock()
            .await
            .get(&institution_id)
            .map(|institution| institution.name().to_owned())
            .unwrap_or_default();

        Ok(Some(LoginAccount {
            user_id: account.id(),
            username: account.username().to_owned(),
            full_name: account.full_name().to_owned(),
            short_name: account.short_name().to_owned(),
            password_hash: password_hash.clone(),
            is_active: account.is_active(),
            institution_id,
            institution_name,
            role_ids: role_ids.clone(),
        }))
    }

    async fn list_menus_for_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<RoleMenuEntry>> {
        let menus = self.menus.lock().await;
        let grants = self.role_menus.lock().await;
        let mut rows = Vec::new();
        for role_id in role_ids {
            for grant in grants.get(role_id).into_iter().flatten() {
                if let Some(menu) = menus.get(&grant.menu_id)
                    && menu.is_active()
                {
                    rows.push(RoleMenuEntry {
                        role_id: *role_id,
                        menu: menu.clone(),
                        methods: grant.methods.clone(),
                    });
                }
            }
        }
        Ok(rows)
    }
}

#[async_trait]
impl UserRepository for FakeStore {
    async fn list_users(&self, institution_id: Option<InstitutionId>) -> AppResult<Vec<UserRecord>> {
        let user_ids: Vec<UserId> = self.users.lock().await.keys().copied().collect();
        let mut records = Vec::new();
        for user_id in user_ids {
            if let Some(mut record) = self.user_record(user_id).await {
                if let Some(institution_id) = institution_id {
                    record
                        .memberships
                        .retain(|membership| membership.institution_id == institution_id);
                    if record.memberships.is_empty() {
                        continue;
                    }
                }
                records.push(record);
            }
        }
        Ok(records)
    }

    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self.user_record(user_id).await)
    }

    async fn create_user(
        &self,
        account: &UserAccount,
        password_hash: &str,
        institution_id: InstitutionId,
        role_ids: &[RoleId],
    ) -> AppResult<()> {
        let mut users = self.users.lock().await;
        if users
            .values()
            .any(|(existing, _)| existing.username() == account.username())
        {
            return Err(AppError::Conflict(format!(
                "username '{}' is taken",
                account.username()
            )));
        }
        users.insert(account.id(), (account.clone(), password_hash.to_owned()));
        self.memberships
            .lock()
            .await
            .insert(account.id(), vec![(institution_id, role_ids.to_vec())]);
        Ok(())
    }

    async fn update_user(
        &self,
        account: &UserAccount,
        password_hash: Option<&str>,
        roles: Option<(InstitutionId, &[RoleId])>,
    ) -> AppResult<()> {
        let mut users = self.users.lock().await;
        let Some(entry) = users.get_mut(&account.id()) else {
            return Err(AppError::NotFound("user does not exist".to_owned()));
        };
        entry.0 = account.clone();
        if let Some(password_hash) = password_hash {
            entry.1 = password_hash.to_owned();
        }
        if let Some((institution_id, role_ids)) = roles {
            for membership in self
                .memberships
                .lock()
                .await
                .entry(account.id())
                .or_default()
                .iter_mut()
            {
                if membership.0 == institution_id {
                    membership.1 = role_ids.to_vec();
                }
            }
        }
        Ok(())
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<()> {
        self.users.lock().await.remove(&user_id);
        self.memberships.lock().await.remove(&user_id);
        Ok(())
    }
}

#[async_trait]
impl InstitutionRepository for FakeStore {
    async fn list_institutions(
        &self,
        institution_id: Option<InstitutionId>,
    ) -> AppResult<Vec<Institution>> {
        Ok(self
            .institutions
            .lock()
            .await
            .values()
            .filter(|institution| institution_id.is_none_or(|id| institution.id() == id))
            .cloned()
            .collect())
    }

    async fn find_institution(
        &self,
        institution_id: InstitutionId,
    ) -> AppResult<Option<Institution>> {
        Ok(self.institutions.lock().await.get(&institution_id).cloned())
    }

    async fn create_institution(&self, institution: &Institution) -> AppResult<()> {
        self.institutions
            .lock()
            .await
            .insert(institution.id(), institution.clone());
        Ok(())
    }

    async fn update_institution(&self, institution: &Institution) -> AppResult<()> {
        self.create_institution(institution).await
    }

    async fn delete_institution(&self, institution_id: InstitutionId) -> AppResult<()> {
        self.institutions.lock().await.remove(&institution_id);
        Ok(())
    }
}

#[async_trait]
impl MenuRepository for FakeStore {
    async fn list_menus(&self) -> AppResult<Vec<MenuDefinition>> {
        let mut menus: Vec<MenuDefinition> = self.menus.lock().await.values().cloned().collect();
        menus.sort_by_key(MenuDefinition::sort_order);
        Ok(menus)
    }

    async fn find_menu(&self, menu_id: MenuId) -> AppResult<Option<MenuDefinition>> {
        Ok(self.menus.lock().await.get(&menu_id).cloned())
    }

    async fn create_menu(&self, menu: &MenuDefinition) -> AppResult<()> {
        let mut menus = self.menus.lock().await;
        if menus
            .values()
            .any(|existing| existing.menu_key() == menu.menu_key())
        {
            return Err(AppError::Conflict(format!(
                "menu '{}' already exists",
                menu.menu_key()
            )));
        }
        menus.insert(menu.id(), menu.clone());
        Ok(())
    }

    async fn update_menu(&self, menu: &MenuDefinition) -> AppResult<()> {
        self.menus.lock().await.insert(menu.id(), menu.clone());
        Ok(())
    }

    async fn delete_menu(&self, menu_id: MenuId) -> AppResult<()> {
        self.menus.lock().await.remove(&menu_id);
        for grants in self.role_menus.lock().await.values_mut() {
            grants.retain(|grant| grant.menu_id != menu_id);
        }
        Ok(())
    }

    async fn list_roles_for_menu(&self, menu_id: MenuId) -> AppResult<Vec<RoleId>> {
        Ok(self
            .role_menus
            .lock()
            .await
            .iter()
            .filter(|(_, grants)| grants.iter().any(|grant| grant.menu_id == menu_id))
            .map(|(role_id, _)| *role_id)
            .collect())
    }
}

#[async_trait]
impl FeatureRepository for FakeStore {
    async fn list_features(&self) -> AppResult<Vec<FeatureDefinition>> {
        let mut features: Vec<FeatureDefinition> =
            self.features.lock().await.values().cloned().collect();
        features.sort_by(|left, right| left.feature_key().cmp(right.feature_key()));
        Ok(features)
    }

    async fn find_feature(&self, feature_id: FeatureId) -> AppResult<Option<FeatureDefinition>> {
        Ok(self.features.lock().await.get(&feature_id).cloned())
    }

    async fn find_feature_by_key(&self, feature_key: &str) -> AppResult<Option<FeatureDefinition>> {
        Ok(self
            .features
            .lock()
            .await
            .values()
            .find(|feature| feature.feature_key() == feature_key)
            .cloned())
    }

    async fn create_feature(&self, feature: &FeatureDefinition) -> AppResult<()> {
        self.features
            .lock()
            .await
            .insert(feature.id(), feature.clone());
        Ok(())
    }

    async fn update_feature(&self, feature: &FeatureDefinition) -> AppResult<()> {
        self.create_feature(feature).await
    }

    async fn list_institution_features(
        &self,
        institution_id: InstitutionId,
    ) -> AppResult<Vec<InstitutionFeature>> {
        Ok(self
            .institution_features
            .lock()
            .await
            .iter()
            .filter(|entry| entry.institution_id == institution_id)
            .cloned()
            .collect())
    }

    async fn upsert_institution_feature(&self, feature: &InstitutionFeature) -> AppResult<()> {
        let mut entries = self.institution_features.lock().await;
        entries.retain(|entry| {
            entry.institution_id != feature.institution_id
                || entry.feature_key != feature.feature_key
        });
        entries.push(feature.clone());
        Ok(())
    }
}

#[async_trait]
impl AuditRepository for FakeStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.audit_events.lock().await.push(event);
        Ok(())
    }

    async fn list_events(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        Ok(self
            .audit_events
            .lock()
            .await
            .iter()
            .rev()
            .filter(|event| {
                query
                    .institution_id
                    .is_none_or(|institution_id| event.institution_id == Some(institution_id))
            })
            .take(query.limit)
            .enumerate()
            .map(|(index, event)| AuditLogEntry {
                event_id: index.to_string(),
                actor_user_id: event.actor_user_id,
                institution_id: event.institution_id,
                action: event.action.as_str().to_owned(),
                resource_type: event.resource_type.clone(),
                resource_id: event.resource_id.clone(),
                detail: event.detail.clone(),
                created_at: String::new(),
            })
            .collect())
    }
}

pub struct Harness {
    pub store: Arc<FakeStore>,
    pub cache: Arc<FakeAccessCache>,
    pub permission_cache: PermissionCache,
    pub scope_resolver: ScopeResolver,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(FakeStore::default());
        let cache = Arc::new(FakeAccessCache::default());
        Self {
            permission_cache: PermissionCache::new(store.clone(), cache.clone()),
            scope_resolver: ScopeResolver::new(store.clone()),
            store,
            cache,
        }
    }
}

pub fn actor(role_ids: Vec<RoleId>, institution_id: Option<InstitutionId>) -> UserIdentity {
    UserIdentity::new(UserId::new(), "actor", role_ids, institution_id)
}
