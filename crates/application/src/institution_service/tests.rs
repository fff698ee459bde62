use tenura_core::{AppError, InstitutionId};
use tenura_domain::RoleScope;

use crate::test_support::{Harness, actor};

use super::{InstitutionService, SaveInstitutionInput};

fn input(name: &str, is_active: bool) -> SaveInstitutionInput {
    SaveInstitutionInput {
        name: name.to_owned(),
        code: name.to_lowercase(),
        address: "1 Main Street".to_owned(),
        phone_number: "555-0100".to_owned(),
        email: Some(String::new()),
        is_active,
    }
}

fn service(harness: &Harness) -> InstitutionService {
    InstitutionService::new(harness.store.clone(), harness.scope_resolver.clone())
}

#[tokio::test]
async fn system_caller_creates_and_deletes_institutions() {
    let harness = Harness::new();
    let admin = harness.store.add_role("admin", RoleScope::System, None).await;
    let service = service(&harness);
    let caller = actor(vec![admin], None);

    let created = service
        .create_institution(&caller, input("East", true))
        .await
        .unwrap_or_else(|error| panic!("create failed: {error}"));
    assert_eq!(created.code(), "EAST");
    assert_eq!(created.email(), None);

    service
        .delete_institution(&caller, created.id())
        .await
        .unwrap_or_else(|error| panic!("delete failed: {error}"));
    assert!(matches!(
        service.get_institution(&caller, created.id()).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn institution_caller_sees_and_edits_only_its_own() {
    let harness = Harness::new();
    let north = harness.store.add_institution("North").await;
    let south = harness.store.add_institution("South").await;
    let manager = harness
        .store
        .add_role("manager", RoleScope::Institution, Some(north))
        .await;
    let service = service(&harness);
    let caller = actor(vec![manager], Some(north));

    let listed = service
        .list_institutions(&caller)
        .await
        .unwrap_or_else(|error| panic!("list failed: {error}"));
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id(), north);

    let renamed = service
        .update_institution(&caller, north, input("North Branch", true))
        .await
        .unwrap_or_else(|error| panic!("update failed: {error}"));
    assert_eq!(renamed.name(), "North Branch");

    assert!(matches!(
        service.get_institution(&caller, south).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        service.update_institution(&caller, north, input("North", false)).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        service.create_institution(&caller, input("West", true)).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        service.delete_institution(&caller, north).await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn deleting_unknown_institution_is_not_found() {
    let harness = Harness::new();
    let admin = harness.store.add_role("admin", RoleScope::System, None).await;

    let result = service(&harness)
        .delete_institution(&actor(vec![admin], None), InstitutionId::new())
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}
