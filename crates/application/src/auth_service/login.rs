use std::collections::BTreeMap;

use tenura_core::{AppError, MenuId};
use tracing::info;

use super::*;

const INVALID_CREDENTIALS: &str = "invalid username or password";

impl AuthService {
    /// Authenticates a user within an institution and mints a session.
    ///
    /// Unknown users, inactive users and wrong passwords share one error so
    /// the response does not reveal which check failed.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        institution_id: InstitutionId,
        now: DateTime<Utc>,
    ) -> AppResult<LoginSession> {
        let username = username.trim();
        let account = self
            .repository
            .find_login_account(username, institution_id)
            .await?;

        let Some(account) = account else {
            // Hash anyway so unknown usernames cost the same as known ones.
            let _ = self.password_hasher.hash_password(password);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_owned()));
        };

        let password_valid = self
            .password_hasher
            .verify_password(password, &account.password_hash)?;
        if !password_valid || !account.is_active {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_owned()));
        }

        if account.role_ids.is_empty() {
            return Err(AppError::Forbidden(
                "user has no role assignment in this institution".to_owned(),
            ));
        }

        let menu_mapping =
            merge_menu_mapping(self.repository.list_menus_for_roles(&account.role_ids).await?);

        let identity = UserIdentity::new(
            account.user_id,
            account.username,
            account.role_ids,
            Some(account.institution_id),
        );
        let token = self.tokens.issue(&identity, false, now)?;

        info!(user_id = %identity.user_id(), %institution_id, "user logged in");

        Ok(LoginSession {
            identity,
            full_name: account.full_name,
            short_name: account.short_name,
            institution_name: account.institution_name,
            token,
            menu_mapping,
        })
    }
}

/// Collapses per-role menu rows into one entry per menu, unioning methods,
/// ordered by sort order then name.
fn merge_menu_mapping(entries: Vec<RoleMenuEntry>) -> Vec<MenuMappingEntry> {
    let mut by_menu: BTreeMap<MenuId, MenuMappingEntry> = BTreeMap::new();
    for entry in entries {
        let merged = by_menu
            .entry(entry.menu.id())
            .or_insert_with(|| MenuMappingEntry {
                menu: entry.menu.clone(),
                methods: MethodAccess::default(),
            });
        merged.methods.merge(&entry.methods);
    }

    let mut mapping: Vec<MenuMappingEntry> = by_menu.into_values().collect();
    mapping.sort_by(|left, right| {
        left.menu
            .sort_order()
            .cmp(&right.menu.sort_order())
            .then_with(|| left.menu.name().cmp(right.menu.name()))
    });
    mapping
}
