use std::collections::HashMap;

use tenura_application::{AccessCache, PasswordHasher};
use tenura_core::{AppResult, InstitutionId, PermissionId, RoleId, UserId};
use tenura_domain::{
    Institution, PermissionDefinition, Role, RoleScope, RoutePermission, UserAccount,
    validate_password,
};
use tracing::info;

use crate::api_config::BootstrapAdminConfig;
use crate::api_services::RepositorySet;

const SYSTEM_ADMIN_ROLE_NAME: &str = "System Administrator";
const PERMISSION_SERVICE: &str = "tenura-api";

/// Ensures an institution, every route permission, a system administrator
/// role holding all of them and an administrator account exist. Safe to
/// run on every start.
pub async fn ensure_bootstrap_admin(
    repositories: &RepositorySet,
    access_cache: &dyn AccessCache,
    password_hasher: &dyn PasswordHasher,
    config: &BootstrapAdminConfig,
) -> AppResult<()> {
    let institution_id = ensure_institution(repositories, config.institution_code.as_str()).await?;
    let permission_ids = ensure_route_permissions(repositories).await?;
    let role_id = ensure_system_admin_role(repositories).await?;

    repositories
        .security_admin_repository
        .replace_role_permissions(role_id, permission_ids.as_slice())
        .await?;
    access_cache.invalidate(role_id).await?;

    ensure_admin_user(
        repositories,
        password_hasher,
        config,
        institution_id,
        role_id,
    )
    .await?;

    info!(
        username = %config.username,
        %institution_id,
        %role_id,
        permissions = permission_ids.len(),
        "bootstrap administrator ensured"
    );
    Ok(())
}

async fn ensure_institution(repositories: &RepositorySet, code: &str) -> AppResult<InstitutionId> {
    let code = code.trim().to_uppercase();
    let existing = repositories
        .institution_repository
        .list_institutions(None)
        .await?
        .into_iter()
        .find(|institution| institution.code() == code);
    if let Some(institution) = existing {
        return Ok(institution.id());
    }

    let institution = Institution::new(
        InstitutionId::new(),
        code.as_str(),
        code.as_str(),
        "",
        "",
        None,
        true,
    )?;
    repositories
        .institution_repository
        .create_institution(&institution)
        .await?;

    info!(institution_id = %institution.id(), %code, "created bootstrap institution");
    Ok(institution.id())
}

async fn ensure_route_permissions(repositories: &RepositorySet) -> AppResult<Vec<PermissionId>> {
    let mut known: HashMap<String, PermissionId> = repositories
        .security_admin_repository
        .list_permissions()
        .await?
        .into_iter()
        .map(|permission| (permission.name().to_owned(), permission.id()))
        .collect();

    let mut permission_ids = Vec::with_capacity(RoutePermission::all().len());
    for route_permission in RoutePermission::all() {
        let name = route_permission.as_str();
        if let Some(permission_id) = known.get(name) {
            permission_ids.push(*permission_id);
            continue;
        }

        let (resource, action) = route_permission.resource_and_action();
        let permission = PermissionDefinition::new(
            PermissionId::new(),
            name,
            PERMISSION_SERVICE,
            resource,
            action,
            true,
            action == "delete",
            format!("Allows {action} on {resource}"),
        )?;
        repositories
            .security_admin_repository
            .create_permission(&permission)
            .await?;

        known.insert(name.to_owned(), permission.id());
        permission_ids.push(permission.id());
    }

    Ok(permission_ids)
}

async fn ensure_system_admin_role(repositories: &RepositorySet) -> AppResult<RoleId> {
    let existing = repositories
        .security_admin_repository
        .list_roles(None)
        .await?
        .into_iter()
        .find(|role| role.scope() == RoleScope::System && role.name() == SYSTEM_ADMIN_ROLE_NAME);
    if let Some(role) = existing {
        return Ok(role.id());
    }

    let role = Role::new(
        RoleId::new(),
        SYSTEM_ADMIN_ROLE_NAME,
        "Holds every administrative permission across institutions",
        RoleScope::System,
        None,
        true,
        true,
    )?;
    repositories
        .security_admin_repository
        .create_role(&role)
        .await?;

    info!(role_id = %role.id(), "created system administrator role");
    Ok(role.id())
}

async fn ensure_admin_user(
    repositories: &RepositorySet,
    password_hasher: &dyn PasswordHasher,
    config: &BootstrapAdminConfig,
    institution_id: InstitutionId,
    role_id: RoleId,
) -> AppResult<()> {
    let existing = repositories
        .user_repository
        .list_users(None)
        .await?
        .into_iter()
        .find(|user| user.account.username() == config.username);

    match existing {
        Some(user) => {
            let holds_role = user.memberships.iter().any(|membership| {
                membership.institution_id == institution_id
                    && membership.role_ids.contains(&role_id)
            });
            if !holds_role {
                let role_ids = [role_id];
                repositories
                    .user_repository
                    .update_user(&user.account, None, Some((institution_id, role_ids.as_slice())))
                    .await?;
                info!(user_id = %user.account.id(), "granted bootstrap role to existing user");
            }
        }
        None => {
            validate_password(config.password.as_str())?;
            let account = UserAccount::new(
                UserId::new(),
                config.username.as_str(),
                format!("{}@tenura.local", config.username),
                "System Administrator",
                "Admin",
                true,
            )?;
            let password_hash = password_hasher.hash_password(config.password.as_str())?;
            repositories
                .user_repository
                .create_user(&account, password_hash.as_str(), institution_id, &[role_id])
                .await?;
            info!(user_id = %account.id(), "created bootstrap administrator");
        }
    }

    Ok(())
}
