use std::sync::Arc;

use tenura_application::{
    AccessCache, AuthorizationGate, FeatureService, InstitutionService, MenuService,
    PermissionCache, ScopeResolver, SecurityAdminService, TokenService,
};
use tenura_core::AppResult;
use tenura_infrastructure::JwtTokenCodec;

use super::SecuritySettings;
use super::repositories::RepositorySet;

pub(super) struct SecurityServices {
    pub(super) token_service: TokenService,
    pub(super) scope_resolver: ScopeResolver,
    pub(super) authorization_gate: AuthorizationGate,
    pub(super) security_admin_service: SecurityAdminService,
    pub(super) institution_service: InstitutionService,
    pub(super) menu_service: MenuService,
    pub(super) feature_service: FeatureService,
}

pub(super) fn build_security_services(
    repositories: &RepositorySet,
    access_cache: Arc<dyn AccessCache>,
    settings: &SecuritySettings,
) -> AppResult<SecurityServices> {
    let token_codec = Arc::new(JwtTokenCodec::new(&settings.token_secret)?);
    let token_service = TokenService::new(token_codec, settings.token_ttl_hours)?;
    let permission_cache =
        PermissionCache::new(repositories.authorization_repository.clone(), access_cache);
    let scope_resolver = ScopeResolver::new(repositories.authorization_repository.clone());

    Ok(SecurityServices {
        authorization_gate: AuthorizationGate::new(token_service.clone(), permission_cache.clone()),
        security_admin_service: SecurityAdminService::new(
            repositories.security_admin_repository.clone(),
            permission_cache.clone(),
            scope_resolver.clone(),
            repositories.audit_repository.clone(),
        ),
        institution_service: InstitutionService::new(
            repositories.institution_repository.clone(),
            scope_resolver.clone(),
        ),
        menu_service: MenuService::new(
            repositories.menu_repository.clone(),
            permission_cache.clone(),
            scope_resolver.clone(),
        ),
        feature_service: FeatureService::new(
            repositories.feature_repository.clone(),
            scope_resolver.clone(),
        ),
        token_service,
        scope_resolver,
    })
}
