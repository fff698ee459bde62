use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use tenura_core::{AppError, AppResult, InstitutionId, RoleId, UserId, UserIdentity};
use tenura_domain::{AuditAction, RoleScope, UserAccount, validate_password};

use crate::{
    AuditEvent, AuditRepository, AuthorizationRepository, CallerScope, PasswordHasher,
    ScopeResolver,
};


/// Institution membership of a user with the roles held there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMembership {
    /// Institution.
    pub institution_id: InstitutionId,
    /// Institution display name.
    pub institution_name: String,
    /// Roles held in the institution.
    pub role_ids: Vec<RoleId>,
}

/// User with its memberships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Profile.
    pub account: UserAccount,
    /// Memberships.
    pub memberships: Vec<UserMembership>,
}

impl UserRecord {
    fn institution_ids(&self) -> Vec<InstitutionId> {
        self.memberships
            .iter()
            .map(|membership| membership.institution_id)
            .collect()
    }

    fn visible_to(mut self, scope: CallerScope) -> Self {
        if let CallerScope::Institution(Some(institution_id)) = scope {
            self.memberships
                .retain(|membership| membership.institution_id == institution_id);
        }
        self
    }
}

/// Input payload for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserInput {
    /// Login name.
    pub username: String,
    /// Email.
    pub email: String,
    /// Full name.
    pub full_name: String,
    /// Short name.
    pub short_name: String,
    /// Plaintext password.
    pub password: String,
    /// Institution the user joins.
    pub institution_id: InstitutionId,
    /// Roles held in that institution.
    pub role_ids: Vec<RoleId>,
}

/// Input payload for updating a user. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateUserInput {
    /// Email.
    pub email: Option<String>,
    /// Full name.
    pub full_name: Option<String>,
    /// Short name.
    pub short_name: Option<String>,
    /// Active flag.
    pub is_active: Option<bool>,
    /// New plaintext password.
    pub password: Option<String>,
    /// Replacement roles in the given institution.
    pub roles: Option<(InstitutionId, Vec<RoleId>)>,
}

/// Repository port for user administration.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Lists users. With an institution, only its members and only that
    /// membership.
    async fn list_users(&self, institution_id: Option<InstitutionId>) -> AppResult<Vec<UserRecord>>;

    /// Finds a user with every membership.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserRecord>>;

    /// Inserts user, membership and role rows in one transaction.
    async fn create_user(
        &self,
        account: &UserAccount,
        password_hash: &str,
        institution_id: InstitutionId,
        role_ids: &[RoleId],
    ) -> AppResult<()>;

    /// Updates the profile, optionally the password hash and the roles held
    /// in one institution, in one transaction.
    async fn update_user(
        &self,
        account: &UserAccount,
        password_hash: Option<&str>,
        roles: Option<(InstitutionId, &[RoleId])>,
    ) -> AppResult<()>;

    /// Deletes a user and its memberships.
    async fn delete_user(&self, user_id: UserId) -> AppResult<()>;
}

/// User administration with institution scoping.
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    roles: Arc<dyn AuthorizationRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    scope_resolver: ScopeResolver,
    audit_repository: Arc<dyn AuditRepository>,
}

impl UserService {
    /// Creates a user service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn UserRepository>,
        roles: Arc<dyn AuthorizationRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        scope_resolver: ScopeResolver,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            repository,
            roles,
            password_hasher,
            scope_resolver,
            audit_repository,
        }
    }

    /// Lists users visible to the caller. Institution-scoped callers only
    /// see members of their institution.
    pub async fn list_users(&self, actor: &UserIdentity) -> AppResult<Vec<UserRecord>> {
        let scope = self.scope_resolver.resolve(actor).await;
        let users = self.repository.list_users(scope.list_filter()?).await?;

        Ok(users
            .into_iter()
            .map(|user| user.visible_to(scope))
            .filter(|user| scope.is_system() || !user.memberships.is_empty())
            .collect())
    }

    /// Returns one user. The row's institutions are checked against the
    /// caller's scope independently of any list filter.
    pub async fn get_user(&self, actor: &UserIdentity, user_id: UserId) -> AppResult<UserRecord> {
        let scope = self.scope_resolver.resolve(actor).await;
        let user = self.find_existing(user_id).await?;
        scope.ensure_row_visible(&user.institution_ids())?;
        Ok(user.visible_to(scope))
    }

    /// Creates a user in one institution with its roles.
    pub async fn create_user(
        &self,
        actor: &UserIdentity,
        input: CreateUserInput,
    ) -> AppResult<UserRecord> {
        let scope = self.scope_resolver.resolve(actor).await;
        scope.ensure_institution(input.institution_id)?;

        validate_password(&input.password)?;
        let role_ids = self
            .validated_roles(scope, input.institution_id, input.role_ids)
            .await?;
        let account = UserAccount::new(
            UserId::new(),
            input.username,
            input.email,
            input.full_name,
            input.short_name,
            true,
        )?;
        let password_hash = self.password_hasher.hash_password(&input.password)?;

        self.repository
            .create_user(&account, &password_hash, input.institution_id, &role_ids)
            .await?;

        self.record(
            actor,
            AuditAction::UserCreated,
            account.id(),
            json!({
                "username": account.username(),
                "institution_id": input.institution_id.to_string(),
            }),
        )
        .await?;

        self.find_existing(account.id())
            .await
            .map(|user| user.visible_to(scope))
    }

    /// Updates a user visible to the caller.
    pub async fn update_user(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        input: UpdateUserInput,
    ) -> AppResult<UserRecord> {
        let scope = self.scope_resolver.resolve(actor).await;
        let existing = self.find_existing(user_id).await?;
        scope.ensure_row_visible(&existing.institution_ids())?;

        let current = &existing.account;
        let account = UserAccount::new(
            current.id(),
            current.username(),
            input.email.unwrap_or_else(|| current.email().to_owned()),
            input
                .full_name
                .unwrap_or_else(|| current.full_name().to_owned()),
            input
                .short_name
                .unwrap_or_else(|| current.short_name().to_owned()),
            input.is_active.unwrap_or(current.is_active()),
        )?;

        let password_hash = match input.password.as_deref() {
            Some(password) => {
                validate_password(password)?;
                Some(self.password_hasher.hash_password(password)?)
            }
            None => None,
        };

        let roles = match input.roles {
            Some((institution_id, role_ids)) => {
                scope.ensure_institution(institution_id)?;
                if !existing.institution_ids().contains(&institution_id) {
                    return Err(AppError::Validation(format!(
                        "user is not a member of institution '{institution_id}'"
                    )));
                }
                Some((
                    institution_id,
                    self.validated_roles(scope, institution_id, role_ids).await?,
                ))
            }
            None => None,
        };

        self.repository
            .update_user(
                &account,
                password_hash.as_deref(),
                roles
                    .as_ref()
                    .map(|(institution_id, role_ids)| (*institution_id, role_ids.as_slice())),
            )
            .await?;

        self.record(
            actor,
            AuditAction::UserUpdated,
            user_id,
            json!({
                "is_active": account.is_active(),
                "password_changed": password_hash.is_some(),
                "roles_replaced": roles.is_some(),
            }),
        )
        .await?;

        self.find_existing(user_id)
            .await
            .map(|user| user.visible_to(scope))
    }

    /// Deletes a user. Institution-scoped callers may only delete users whose
    /// every membership is in their institution.
    pub async fn delete_user(&self, actor: &UserIdentity, user_id: UserId) -> AppResult<()> {
        let scope = self.scope_resolver.resolve(actor).await;
        let existing = self.find_existing(user_id).await?;
        for institution_id in existing.institution_ids() {
            scope.ensure_institution(institution_id)?;
        }
        if existing.memberships.is_empty() {
            scope.require_system("deleting users without membership")?;
        }
        if user_id == actor.user_id() {
            return Err(AppError::Conflict(
                "users cannot delete themselves".to_owned(),
            ));
        }

        self.repository.delete_user(user_id).await?;

        self.record(
            actor,
            AuditAction::UserDeleted,
            user_id,
            json!({ "username": existing.account.username() }),
        )
        .await
    }

    async fn find_existing(&self, user_id: UserId) -> AppResult<UserRecord> {
        self.repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
    }

    /// Checks that each role exists, is active and may be held in the
    /// institution. System roles can only be handed out by system callers.
    async fn validated_roles(
        &self,
        scope: CallerScope,
        institution_id: InstitutionId,
        role_ids: Vec<RoleId>,
    ) -> AppResult<Vec<RoleId>> {
        let role_ids: Vec<RoleId> = role_ids
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if role_ids.is_empty() {
            return Err(AppError::Validation(
                "role_ids must not be empty".to_owned(),
            ));
        }

        for role_id in &role_ids {
            let role = self
                .roles
                .find_role(*role_id)
                .await?
                .ok_or_else(|| AppError::Validation(format!("role '{role_id}' does not exist")))?;

            if !role.is_active() {
                return Err(AppError::Validation(format!(
                    "role '{}' is inactive",
                    role.name()
                )));
            }

            match role.scope() {
                RoleScope::System => scope.require_system("granting system roles")?,
                RoleScope::Institution if role.institution_id() != Some(institution_id) => {
                    return Err(AppError::Validation(format!(
                        "role '{}' belongs to another institution",
                        role.name()
                    )));
                }
                RoleScope::Institution => {}
            }
        }

        Ok(role_ids)
    }

    async fn record(
        &self,
        actor: &UserIdentity,
        action: AuditAction,
        user_id: UserId,
        detail: serde_json::Value,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                actor_user_id: actor.user_id(),
                institution_id: actor.institution_id(),
                action,
                resource_type: "user".to_owned(),
                resource_id: user_id.to_string(),
                detail: Some(detail),
            })
            .await
    }
}
