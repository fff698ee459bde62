use std::sync::atomic::Ordering;

use tenura_core::{AppError, InstitutionId, PermissionId, RoleId};
use tenura_domain::{AuditAction, MethodAccess, PermissionMutableUpdate, RoleMenuGrant, RoleScope};

use crate::test_support::{Harness, actor};
use crate::{CreatePermissionInput, CreateRoleInput, UpdateRoleInput};

use super::SecurityAdminService;

struct Fixture {
    harness: Harness,
    service: SecurityAdminService,
    admin: RoleId,
}

async fn fixture() -> Fixture {
    let harness = Harness::new();
    let admin = harness.store.add_role("admin", RoleScope::System, None).await;
    let service = SecurityAdminService::new(
        harness.store.clone(),
        harness.permission_cache.clone(),
        harness.scope_resolver.clone(),
        harness.store.clone(),
    );
    Fixture {
        harness,
        service,
        admin,
    }
}

#[tokio::test]
async fn reassigned_permissions_are_visible_on_next_resolution() {
    let fixture = fixture().await;
    let store = &fixture.harness.store;
    let role_id = store.add_role("auditor", RoleScope::System, None).await;
    let p1 = store.add_permission("user.read").await;
    let p2 = store.add_permission("user.update").await;
    store.grant(role_id, p1).await;

    let before = fixture
        .harness
        .permission_cache
        .resolve(&[role_id])
        .await
        .unwrap_or_else(|error| panic!("resolve failed: {error}"));
    assert!(before.access.has_permission("user.read"));

    fixture
        .service
        .assign_role_permissions(&actor(vec![fixture.admin], None), role_id, vec![p2, p2])
        .await
        .unwrap_or_else(|error| panic!("assign failed: {error}"));

    let after = fixture
        .harness
        .permission_cache
        .resolve(&[role_id])
        .await
        .unwrap_or_else(|error| panic!("resolve failed: {error}"));
    assert!(!after.from_cache);
    assert!(after.access.has_permission("user.update"));
    assert!(!after.access.has_permission("user.read"));
    assert_eq!(store.permission_names_of(role_id).await, vec!["user.update"]);
}

#[tokio::test]
async fn aborted_replacement_keeps_previous_grants() {
    let fixture = fixture().await;
    let store = &fixture.harness.store;
    let role_id = store.add_role("auditor", RoleScope::System, None).await;
    let p1 = store.add_permission("user.read").await;
    let p2 = store.add_permission("user.update").await;
    store.grant(role_id, p1).await;
    store.abort_replacements.store(true, Ordering::SeqCst);

    let result = fixture
        .service
        .assign_role_permissions(&actor(vec![fixture.admin], None), role_id, vec![p2])
        .await;

    assert!(matches!(result, Err(AppError::Internal(_))));
    assert_eq!(store.permission_names_of(role_id).await, vec!["user.read"]);
    let resolved = fixture
        .harness
        .permission_cache
        .resolve(&[role_id])
        .await
        .unwrap_or_else(|error| panic!("resolve failed: {error}"));
    assert!(resolved.access.has_permission("user.read"));
    assert!(store.audit_events.lock().await.is_empty());
}

#[tokio::test]
async fn unknown_permission_in_replacement_is_not_found() {
    let fixture = fixture().await;
    let store = &fixture.harness.store;
    let role_id = store.add_role("auditor", RoleScope::System, None).await;
    let p1 = store.add_permission("user.read").await;
    store.grant(role_id, p1).await;

    let result = fixture
        .service
        .assign_role_permissions(
            &actor(vec![fixture.admin], None),
            role_id,
            vec![p1, PermissionId::new()],
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(store.permission_names_of(role_id).await, vec!["user.read"]);
}

#[tokio::test]
async fn empty_permission_list_is_rejected() {
    let fixture = fixture().await;
    let role_id = fixture
        .harness
        .store
        .add_role("auditor", RoleScope::System, None)
        .await;

    let result = fixture
        .service
        .assign_role_permissions(&actor(vec![fixture.admin], None), role_id, Vec::new())
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn replacing_permissions_drops_cached_access_and_audits() {
    let fixture = fixture().await;
    let store = &fixture.harness.store;
    let role_id = store.add_role("auditor", RoleScope::System, None).await;
    let p1 = store.add_permission("user.read").await;
    store.grant(role_id, p1).await;
    fixture
        .harness
        .permission_cache
        .resolve(&[role_id])
        .await
        .unwrap_or_else(|error| panic!("resolve failed: {error}"));
    assert!(fixture.harness.cache.entries.lock().await.contains_key(&role_id));

    fixture
        .service
        .assign_role_permissions(&actor(vec![fixture.admin], None), role_id, vec![p1])
        .await
        .unwrap_or_else(|error| panic!("assign failed: {error}"));

    assert!(!fixture.harness.cache.entries.lock().await.contains_key(&role_id));
    let events = store.audit_events.lock().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::RolePermissionsReplaced);
    assert_eq!(events[0].resource_id, role_id.to_string());
}

#[tokio::test]
async fn deactivating_a_permission_invalidates_every_holder() {
    let fixture = fixture().await;
    let store = &fixture.harness.store;
    let first = store.add_role("first", RoleScope::System, None).await;
    let second = store.add_role("second", RoleScope::System, None).await;
    let permission_id = store.add_permission("user.delete").await;
    store.grant(first, permission_id).await;
    store.grant(second, permission_id).await;
    fixture
        .harness
        .permission_cache
        .resolve(&[first, second])
        .await
        .unwrap_or_else(|error| panic!("resolve failed: {error}"));

    let updated = fixture
        .service
        .update_permission(
            &actor(vec![fixture.admin], None),
            permission_id,
            PermissionMutableUpdate {
                is_active: Some(false),
                ..PermissionMutableUpdate::default()
            },
        )
        .await
        .unwrap_or_else(|error| panic!("update failed: {error}"));

    assert!(!updated.is_active());
    assert!(fixture.harness.cache.entries.lock().await.is_empty());
    let resolved = fixture
        .harness
        .permission_cache
        .resolve(&[first, second])
        .await
        .unwrap_or_else(|error| panic!("resolve failed: {error}"));
    assert!(!resolved.access.has_permission("user.delete"));
}

#[tokio::test]
async fn empty_permission_update_is_rejected() {
    let fixture = fixture().await;
    let permission_id = fixture.harness.store.add_permission("user.read").await;

    let result = fixture
        .service
        .update_permission(
            &actor(vec![fixture.admin], None),
            permission_id,
            PermissionMutableUpdate::default(),
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn duplicate_permission_name_conflicts() {
    let fixture = fixture().await;
    fixture.harness.store.add_permission("user.read").await;

    let result = fixture
        .service
        .create_permission(
            &actor(vec![fixture.admin], None),
            CreatePermissionInput {
                name: "user.read".to_owned(),
                service: "gateway".to_owned(),
                resource: "user".to_owned(),
                action: "read".to_owned(),
                is_high_risk: false,
                description: String::new(),
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn institution_caller_cannot_touch_global_catalogues() {
    let fixture = fixture().await;
    let store = &fixture.harness.store;
    let institution_id = store.add_institution("North").await;
    let manager = store
        .add_role("manager", RoleScope::Institution, Some(institution_id))
        .await;
    let caller = actor(vec![manager], Some(institution_id));

    let system_role = fixture
        .service
        .create_role(
            &caller,
            CreateRoleInput {
                name: "root".to_owned(),
                description: String::new(),
                scope: RoleScope::System,
                institution_id: None,
                is_administrator: true,
            },
        )
        .await;
    let permission = fixture
        .service
        .create_permission(
            &caller,
            CreatePermissionInput {
                name: "report.read".to_owned(),
                service: "gateway".to_owned(),
                resource: "report".to_owned(),
                action: "read".to_owned(),
                is_high_risk: false,
                description: String::new(),
            },
        )
        .await;

    assert!(matches!(system_role, Err(AppError::Forbidden(_))));
    assert!(matches!(permission, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn institution_caller_manages_only_its_own_roles() {
    let fixture = fixture().await;
    let store = &fixture.harness.store;
    let own = store.add_institution("North").await;
    let foreign = store.add_institution("South").await;
    let manager = store.add_role("manager", RoleScope::Institution, Some(own)).await;
    let foreign_role = store
        .add_role("clerk", RoleScope::Institution, Some(foreign))
        .await;
    let caller = actor(vec![manager], Some(own));

    let created = fixture
        .service
        .create_role(
            &caller,
            CreateRoleInput {
                name: "teller".to_owned(),
                description: "front desk".to_owned(),
                scope: RoleScope::Institution,
                institution_id: Some(own),
                is_administrator: false,
            },
        )
        .await
        .unwrap_or_else(|error| panic!("create failed: {error}"));
    assert_eq!(created.institution_id(), Some(own));

    let listed = fixture
        .service
        .list_roles(&caller)
        .await
        .unwrap_or_else(|error| panic!("list failed: {error}"));
    assert!(listed.iter().all(|role| role.institution_id() == Some(own)));

    let foreign_update = fixture
        .service
        .update_role(
            &caller,
            foreign_role,
            UpdateRoleInput {
                name: "clerk".to_owned(),
                description: String::new(),
                is_active: false,
                is_administrator: false,
            },
        )
        .await;
    assert!(matches!(foreign_update, Err(AppError::Forbidden(_))));

    let foreign_create = fixture
        .service
        .create_role(
            &caller,
            CreateRoleInput {
                name: "intruder".to_owned(),
                description: String::new(),
                scope: RoleScope::Institution,
                institution_id: Some(InstitutionId::new()),
                is_administrator: false,
            },
        )
        .await;
    assert!(matches!(foreign_create, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn deactivating_a_role_withdraws_its_access() {
    let fixture = fixture().await;
    let store = &fixture.harness.store;
    let role_id = store.add_role("auditor", RoleScope::System, None).await;
    let permission_id = store.add_permission("audit.read").await;
    store.grant(role_id, permission_id).await;
    fixture
        .harness
        .permission_cache
        .resolve(&[role_id])
        .await
        .unwrap_or_else(|error| panic!("resolve failed: {error}"));

    fixture
        .service
        .update_role(
            &actor(vec![fixture.admin], None),
            role_id,
            UpdateRoleInput {
                name: "auditor".to_owned(),
                description: String::new(),
                is_active: false,
                is_administrator: false,
            },
        )
        .await
        .unwrap_or_else(|error| panic!("update failed: {error}"));

    let resolved = fixture
        .harness
        .permission_cache
        .resolve(&[role_id])
        .await
        .unwrap_or_else(|error| panic!("resolve failed: {error}"));
    assert!(resolved.access.is_empty());
}

#[tokio::test]
async fn repeated_menus_are_merged_on_assignment() {
    let fixture = fixture().await;
    let store = &fixture.harness.store;
    let role_id = store.add_role("auditor", RoleScope::System, None).await;
    let menu_id = store.add_menu("users", 1).await;

    fixture
        .service
        .assign_role_menus(
            &actor(vec![fixture.admin], None),
            role_id,
            vec![
                RoleMenuGrant {
                    menu_id,
                    methods: MethodAccess::parse("GET"),
                },
                RoleMenuGrant {
                    menu_id,
                    methods: MethodAccess::parse("post"),
                },
            ],
        )
        .await
        .unwrap_or_else(|error| panic!("assign failed: {error}"));

    let mappings = fixture
        .service
        .list_role_menus(&actor(vec![fixture.admin], None), role_id)
        .await
        .unwrap_or_else(|error| panic!("list failed: {error}"));
    assert_eq!(mappings.len(), 1);
    assert_eq!(mappings[0].methods.to_access_string(), "GET,POST");
}
