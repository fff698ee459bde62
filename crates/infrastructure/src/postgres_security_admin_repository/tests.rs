use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use tenura_application::{AuthorizationRepository, SecurityAdminRepository};
use tenura_core::{AppError, InstitutionId, PermissionId, RoleId};
use tenura_domain::{PermissionDefinition, Role, RoleScope};

use super::PostgresSecurityAdminRepository;
use crate::PostgresAuthorizationRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres security admin tests: {error}");
    }

    Some(pool)
}

async fn ensure_institution(pool: &PgPool, institution_id: InstitutionId) {
    let insert = sqlx::query(
        r#"
            INSERT INTO institutions (id, name, code, address, phone_number, is_active)
            VALUES ($1, 'Test clinic', $2, '', '', TRUE)
            ON CONFLICT (id) DO NOTHING
            "#,
    )
    .bind(institution_id.as_uuid())
    .bind(format!("T-{institution_id}"))
    .execute(pool)
    .await;

    assert!(insert.is_ok());
}

fn permission(name: &str) -> PermissionDefinition {
    PermissionDefinition::new(PermissionId::new(), name, "core", "user", "read", true, false, "")
        .unwrap_or_else(|_| panic!("permission should be valid"))
}

#[tokio::test]
async fn replace_role_permissions_is_atomic() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresSecurityAdminRepository::new(pool.clone());
    let authorization = PostgresAuthorizationRepository::new(pool.clone());
    let institution_id = InstitutionId::new();
    ensure_institution(&pool, institution_id).await;

    let role = Role::new(
        RoleId::new(),
        format!("clerk-{}", RoleId::new()),
        "",
        RoleScope::Institution,
        Some(institution_id),
        true,
        false,
    )
    .unwrap_or_else(|_| panic!("role should be valid"));
    assert!(repository.create_role(&role).await.is_ok());

    let kept = permission(&format!("user.read.{}", PermissionId::new()));
    let added = permission(&format!("user.write.{}", PermissionId::new()));
    assert!(repository.create_permission(&kept).await.is_ok());
    assert!(repository.create_permission(&added).await.is_ok());
    assert!(
        repository
            .replace_role_permissions(role.id(), &[kept.id()])
            .await
            .is_ok()
    );

    let failed = repository
        .replace_role_permissions(role.id(), &[added.id(), PermissionId::new()])
        .await;
    assert!(matches!(failed, Err(AppError::NotFound(_))));

    let names = authorization
        .list_permission_names_for_roles(&[role.id()])
        .await
        .unwrap_or_else(|_| panic!("permission names should load"));
    assert_eq!(names.len(), 1);
    assert_eq!(names[0].permission_name, kept.name());

    assert!(
        repository
            .replace_role_permissions(role.id(), &[added.id()])
            .await
            .is_ok()
    );
    let granted = repository
        .list_role_permissions(role.id())
        .await
        .unwrap_or_else(|_| panic!("role permissions should load"));
    assert_eq!(granted, vec![added]);
}

#[tokio::test]
async fn duplicate_permission_names_conflict() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresSecurityAdminRepository::new(pool);
    let name = format!("audit.read.{}", PermissionId::new());

    assert!(repository.create_permission(&permission(&name)).await.is_ok());
    let duplicate = repository.create_permission(&permission(&name)).await;

    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
}
