use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tenura_core::{AppResult, InstitutionId, RoleId, UserId, UserIdentity};
use tenura_domain::{MenuDefinition, MethodAccess};

use crate::{IssuedToken, TokenService};

mod login;

/// Port for password hashing. Keeps the application free of direct
/// cryptographic library coupling.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash. A mismatch is
    /// `Ok(false)`, not an error.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

/// Credentials and memberships of a user within one institution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginAccount {
    /// User id.
    pub user_id: UserId,
    /// Login name.
    pub username: String,
    /// Full name.
    pub full_name: String,
    /// Short name.
    pub short_name: String,
    /// Stored password hash.
    pub password_hash: String,
    /// Whether the account may log in.
    pub is_active: bool,
    /// Institution the login targets.
    pub institution_id: InstitutionId,
    /// Institution display name.
    pub institution_name: String,
    /// Roles held in the institution.
    pub role_ids: Vec<RoleId>,
}

/// Active menu reachable through one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMenuEntry {
    /// Role granting the menu.
    pub role_id: RoleId,
    /// Menu definition.
    pub menu: MenuDefinition,
    /// Methods allowed through this role.
    pub methods: MethodAccess,
}

/// Menu reachable by the session, merged across roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuMappingEntry {
    /// Menu definition.
    pub menu: MenuDefinition,
    /// Methods allowed through any role.
    pub methods: MethodAccess,
}

/// Outcome of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSession {
    /// Identity carried by the token.
    pub identity: UserIdentity,
    /// Full name.
    pub full_name: String,
    /// Short name.
    pub short_name: String,
    /// Institution display name.
    pub institution_name: String,
    /// Signed token and expiry.
    pub token: IssuedToken,
    /// Menus reachable by any role, one entry per menu.
    pub menu_mapping: Vec<MenuMappingEntry>,
}

/// Storage consumed by login.
#[async_trait]
pub trait LoginRepository: Send + Sync {
    /// Finds a user by username with its roles in an active institution.
    async fn find_login_account(
        &self,
        username: &str,
        institution_id: InstitutionId,
    ) -> AppResult<Option<LoginAccount>>;

    /// Lists active menus mapped to active roles in the set, one row per
    /// role and menu.
    async fn list_menus_for_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<RoleMenuEntry>>;
}

/// Login and logout use-cases.
#[derive(Clone)]
pub struct AuthService {
    repository: Arc<dyn LoginRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    tokens: TokenService,
}

impl AuthService {
    /// Creates an auth service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn LoginRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        tokens: TokenService,
    ) -> Self {
        Self {
            repository,
            password_hasher,
            tokens,
        }
    }

    /// Issues the already-expired token that tells the client to drop its
    /// session. Tokens issued earlier stay valid until their own expiry.
    pub fn logout(&self, actor: &UserIdentity, now: DateTime<Utc>) -> AppResult<IssuedToken> {
        self.tokens.issue(actor, true, now)
    }
}
