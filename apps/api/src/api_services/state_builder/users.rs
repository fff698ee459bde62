use std::sync::Arc;

use tenura_application::{AuthService, PasswordHasher, UserService};

use super::repositories::RepositorySet;
use super::security::SecurityServices;

pub(super) struct UserServices {
    pub(super) auth_service: AuthService,
    pub(super) user_service: UserService,
}

pub(super) fn build_user_services(
    repositories: &RepositorySet,
    security_services: &SecurityServices,
    password_hasher: Arc<dyn PasswordHasher>,
) -> UserServices {
    UserServices {
        auth_service: AuthService::new(
            repositories.login_repository.clone(),
            password_hasher.clone(),
            security_services.token_service.clone(),
        ),
        user_service: UserService::new(
            repositories.user_repository.clone(),
            repositories.authorization_repository.clone(),
            password_hasher,
            security_services.scope_resolver.clone(),
            repositories.audit_repository.clone(),
        ),
    }
}
