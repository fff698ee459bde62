use std::time::Duration;

use sqlx::PgPool;
use tenura_application::{
    AuthService, AuthorizationGate, FeatureService, InstitutionService, MenuService,
    SecurityAdminService, UserService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub authorization_gate: AuthorizationGate,
    pub security_admin_service: SecurityAdminService,
    pub user_service: UserService,
    pub institution_service: InstitutionService,
    pub menu_service: MenuService,
    pub feature_service: FeatureService,
    pub resolution_timeout: Duration,
    pub postgres_pool: Option<PgPool>,
    pub redis_client: Option<redis::Client>,
}
