use serde::{Deserialize, Serialize};
use tenura_application::{IssuedToken, LoginSession, MenuMappingEntry};
use tenura_core::{InstitutionId, MenuId, RoleId, UserId};

use super::rfc3339;

/// Incoming payload for institution-bound login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub institution_id: InstitutionId,
}

/// Menu reachable by the session together with its allowed methods.
#[derive(Debug, Serialize)]
pub struct MenuMappingResponse {
    pub menu_id: MenuId,
    pub menu_key: String,
    pub name: String,
    pub route: String,
    pub icon: String,
    pub parent_id: Option<MenuId>,
    pub sort_order: i32,
    pub access: String,
}

/// Successful login payload.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: UserId,
    pub username: String,
    pub full_name: String,
    pub short_name: String,
    pub role_ids: Vec<RoleId>,
    pub token: String,
    pub expires_at: String,
    pub institution_id: Option<InstitutionId>,
    pub institution_name: String,
    pub menu_mapping: Vec<MenuMappingResponse>,
}

/// Logout payload carrying the already-expired token.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub token: String,
    pub expires_at: String,
}

impl From<MenuMappingEntry> for MenuMappingResponse {
    fn from(entry: MenuMappingEntry) -> Self {
        let menu = entry.menu;
        Self {
            menu_id: menu.id(),
            menu_key: menu.menu_key().to_owned(),
            name: menu.name().to_owned(),
            route: menu.route().to_owned(),
            icon: menu.icon().to_owned(),
            parent_id: menu.parent_id(),
            sort_order: menu.sort_order(),
            access: entry.methods.to_access_string(),
        }
    }
}

impl From<LoginSession> for LoginResponse {
    fn from(session: LoginSession) -> Self {
        Self {
            user_id: session.identity.user_id(),
            username: session.identity.username().to_owned(),
            full_name: session.full_name,
            short_name: session.short_name,
            role_ids: session.identity.role_ids().to_vec(),
            token: session.token.token,
            expires_at: rfc3339(session.token.expires_at),
            institution_id: session.identity.institution_id(),
            institution_name: session.institution_name,
            menu_mapping: session
                .menu_mapping
                .into_iter()
                .map(MenuMappingResponse::from)
                .collect(),
        }
    }
}

impl From<IssuedToken> for LogoutResponse {
    fn from(token: IssuedToken) -> Self {
        Self {
            token: token.token,
            expires_at: rfc3339(token.expires_at),
        }
    }
}
