use std::sync::Arc;
use std::time::Duration;

use tenura_application::AccessCache;
use tenura_core::AppResult;
use tenura_infrastructure::Argon2PasswordHasher;

use crate::api_config::ApiConfig;
use crate::state::AppState;

mod caches;
mod repositories;
mod security;
mod users;

pub use caches::build_access_cache;
pub use repositories::RepositorySet;

/// Token and gate settings shared by every service set.
#[derive(Debug, Clone)]
pub struct SecuritySettings {
    pub token_secret: String,
    pub token_ttl_hours: u32,
    pub resolution_timeout: Duration,
}

impl From<&ApiConfig> for SecuritySettings {
    fn from(config: &ApiConfig) -> Self {
        Self {
            token_secret: config.access_token_secret.clone(),
            token_ttl_hours: config.access_token_ttl_hours,
            resolution_timeout: config.access_resolution_timeout,
        }
    }
}

/// Wires services over a repository set and an access cache. Health probes
/// are left unset.
pub fn assemble_app_state(
    repositories: &RepositorySet,
    access_cache: Arc<dyn AccessCache>,
    settings: &SecuritySettings,
) -> AppResult<AppState> {
    let password_hasher = Arc::new(Argon2PasswordHasher::new());
    let security_services = security::build_security_services(repositories, access_cache, settings)?;
    let user_services =
        users::build_user_services(repositories, &security_services, password_hasher);

    Ok(AppState {
        auth_service: user_services.auth_service,
        user_service: user_services.user_service,
        authorization_gate: security_services.authorization_gate,
        security_admin_service: security_services.security_admin_service,
        institution_service: security_services.institution_service,
        menu_service: security_services.menu_service,
        feature_service: security_services.feature_service,
        resolution_timeout: settings.resolution_timeout,
        postgres_pool: None,
        redis_client: None,
    })
}
