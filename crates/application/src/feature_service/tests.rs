use tenura_core::AppError;
use tenura_domain::RoleScope;

use crate::test_support::{Harness, actor};

use super::{FeatureService, SaveFeatureInput};

fn input(feature_key: &str, default_enabled: bool) -> SaveFeatureInput {
    SaveFeatureInput {
        feature_key: feature_key.to_owned(),
        name: feature_key.to_owned(),
        description: String::new(),
        feature_type: "module".to_owned(),
        default_enabled,
    }
}

#[tokio::test]
async fn institution_override_wins_over_default() {
    let harness = Harness::new();
    let admin = harness.store.add_role("admin", RoleScope::System, None).await;
    let institution_id = harness.store.add_institution("North").await;
    let manager = harness
        .store
        .add_role("manager", RoleScope::Institution, Some(institution_id))
        .await;
    let service = FeatureService::new(harness.store.clone(), harness.scope_resolver.clone());
    service
        .create_feature(&actor(vec![admin], None), input("billing", true))
        .await
        .unwrap_or_else(|error| panic!("create failed: {error}"));
    service
        .create_feature(&actor(vec![admin], None), input("reports", false))
        .await
        .unwrap_or_else(|error| panic!("create failed: {error}"));
    let caller = actor(vec![manager], Some(institution_id));

    service
        .set_institution_feature(&caller, institution_id, "billing", false)
        .await
        .unwrap_or_else(|error| panic!("override failed: {error}"));
    let effective = service
        .list_institution_features(&caller, institution_id)
        .await
        .unwrap_or_else(|error| panic!("list failed: {error}"));

    let billing = effective
        .iter()
        .find(|entry| entry.feature.feature_key() == "billing")
        .unwrap_or_else(|| panic!("billing listed"));
    assert!(!billing.is_enabled && billing.overridden);
    let reports = effective
        .iter()
        .find(|entry| entry.feature.feature_key() == "reports")
        .unwrap_or_else(|| panic!("reports listed"));
    assert!(!reports.is_enabled && !reports.overridden);
}

#[tokio::test]
async fn feature_key_is_immutable() {
    let harness = Harness::new();
    let admin = harness.store.add_role("admin", RoleScope::System, None).await;
    let service = FeatureService::new(harness.store.clone(), harness.scope_resolver.clone());
    let caller = actor(vec![admin], None);
    let feature = service
        .create_feature(&caller, input("billing", true))
        .await
        .unwrap_or_else(|error| panic!("create failed: {error}"));

    let result = service
        .update_feature(&caller, feature.id(), input("invoicing", true))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn unknown_feature_override_is_not_found() {
    let harness = Harness::new();
    let admin = harness.store.add_role("admin", RoleScope::System, None).await;
    let institution_id = harness.store.add_institution("North").await;
    let service = FeatureService::new(harness.store.clone(), harness.scope_resolver.clone());

    let result = service
        .set_institution_feature(&actor(vec![admin], None), institution_id, "missing", true)
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}
