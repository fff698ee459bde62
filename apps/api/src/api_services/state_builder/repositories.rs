use std::sync::Arc;

use sqlx::PgPool;
use tenura_application::{
    AuditRepository, AuthorizationRepository, FeatureRepository, InstitutionRepository,
    LoginRepository, MenuRepository, SecurityAdminRepository, UserRepository,
};
use tenura_infrastructure::{
    PostgresAuditRepository, PostgresAuthorizationRepository, PostgresFeatureRepository,
    PostgresInstitutionRepository, PostgresMenuRepository, PostgresSecurityAdminRepository,
    PostgresUserRepository,
};

/// Storage ports consumed by the API services.
#[derive(Clone)]
pub struct RepositorySet {
    pub authorization_repository: Arc<dyn AuthorizationRepository>,
    pub login_repository: Arc<dyn LoginRepository>,
    pub security_admin_repository: Arc<dyn SecurityAdminRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub institution_repository: Arc<dyn InstitutionRepository>,
    pub menu_repository: Arc<dyn MenuRepository>,
    pub feature_repository: Arc<dyn FeatureRepository>,
    pub audit_repository: Arc<dyn AuditRepository>,
}

impl RepositorySet {
    pub fn postgres(pool: &PgPool) -> Self {
        let user_repository = Arc::new(PostgresUserRepository::new(pool.clone()));

        Self {
            authorization_repository: Arc::new(PostgresAuthorizationRepository::new(pool.clone())),
            login_repository: user_repository.clone(),
            security_admin_repository: Arc::new(PostgresSecurityAdminRepository::new(
                pool.clone(),
            )),
            user_repository,
            institution_repository: Arc::new(PostgresInstitutionRepository::new(pool.clone())),
            menu_repository: Arc::new(PostgresMenuRepository::new(pool.clone())),
            feature_repository: Arc::new(PostgresFeatureRepository::new(pool.clone())),
            audit_repository: Arc::new(PostgresAuditRepository::new(pool.clone())),
        }
    }

    #[cfg(test)]
    pub fn in_memory(repository: Arc<tenura_infrastructure::InMemoryAdminRepository>) -> Self {
        Self {
            authorization_repository: repository.clone(),
            login_repository: repository.clone(),
            security_admin_repository: repository.clone(),
            user_repository: repository.clone(),
            institution_repository: repository.clone(),
            menu_repository: repository.clone(),
            feature_repository: repository.clone(),
            audit_repository: repository,
        }
    }
}
