use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tenura_core::AppError;
use tenura_domain::RoleScope;

use crate::PermissionCache;
use crate::test_support::{FakeAccessCache, Harness};

#[tokio::test]
async fn second_resolution_is_served_from_cache() {
    let harness = Harness::new();
    let role_id = harness.store.add_role("auditor", RoleScope::System, None).await;
    let permission_id = harness.store.add_permission("audit.read").await;
    harness.store.grant(role_id, permission_id).await;

    let first = harness.permission_cache.resolve(&[role_id]).await;
    let second = harness.permission_cache.resolve(&[role_id]).await;

    let (Ok(first), Ok(second)) = (first, second) else {
        panic!("resolution should succeed");
    };
    assert!(!first.from_cache);
    assert!(second.from_cache);
    assert_eq!(first.access, second.access);
    assert!(second.access.has_permission("audit.read"));
    assert_eq!(harness.store.access_reads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cached_access_equals_storage_recomputation() {
    let harness = Harness::new();
    let institution_id = harness.store.add_institution("North").await;
    let clerk = harness
        .store
        .add_role("clerk", RoleScope::Institution, Some(institution_id))
        .await;
    let reviewer = harness
        .store
        .add_role("reviewer", RoleScope::Institution, Some(institution_id))
        .await;
    let user_read = harness.store.add_permission("user.read").await;
    let user_update = harness.store.add_permission("user.update").await;
    harness.store.grant(clerk, user_read).await;
    harness.store.grant(reviewer, user_update).await;
    let menu_id = harness.store.add_menu("users", 1).await;
    harness.store.map_menu(clerk, menu_id, "GET").await;
    harness.store.map_menu(reviewer, menu_id, "PUT").await;

    let warmed = harness.permission_cache.resolve(&[clerk, reviewer]).await;
    let cached = harness.permission_cache.resolve(&[reviewer, clerk, clerk]).await;
    let uncached = PermissionCache::new(harness.store.clone(), Arc::new(FakeAccessCache::default()))
        .resolve(&[clerk, reviewer])
        .await;

    let (Ok(warmed), Ok(cached), Ok(uncached)) = (warmed, cached, uncached) else {
        panic!("resolution should succeed");
    };
    assert!(cached.from_cache);
    assert!(!uncached.from_cache);
    let recomputed = uncached.access;
    assert_eq!(warmed.access, recomputed);
    assert_eq!(cached.access, recomputed);
    assert!(recomputed.allows_menu_method(menu_id, "GET"));
    assert!(recomputed.allows_menu_method(menu_id, "PUT"));
}

#[tokio::test]
async fn partially_cached_role_set_is_not_reported_as_cached() {
    let harness = Harness::new();
    let first = harness.store.add_role("first", RoleScope::System, None).await;
    let second = harness.store.add_role("second", RoleScope::System, None).await;

    assert!(harness.permission_cache.resolve(&[first]).await.is_ok());
    let resolved = harness.permission_cache.resolve(&[first, second]).await;

    assert!(resolved.is_ok_and(|resolved| !resolved.from_cache));
}

#[tokio::test]
async fn role_without_grants_resolves_to_cached_empty_map() {
    let harness = Harness::new();
    let role_id = harness.store.add_role("empty", RoleScope::System, None).await;

    let first = harness.permission_cache.resolve(&[role_id]).await;
    let second = harness.permission_cache.resolve(&[role_id]).await;

    assert!(first.is_ok_and(|resolved| resolved.access.is_empty()));
    assert!(second.is_ok_and(|resolved| resolved.from_cache && resolved.access.is_empty()));
}

#[tokio::test]
async fn empty_role_set_resolves_to_empty_map() {
    let harness = Harness::new();
    let resolved = harness.permission_cache.resolve(&[]).await;
    assert!(resolved.is_ok_and(|resolved| resolved.access.is_empty() && !resolved.from_cache));
}

#[tokio::test]
async fn cache_read_failure_falls_back_to_storage() {
    let harness = Harness::new();
    let role_id = harness.store.add_role("auditor", RoleScope::System, None).await;
    let permission_id = harness.store.add_permission("audit.read").await;
    harness.store.grant(role_id, permission_id).await;
    harness.cache.fail_reads.store(true, Ordering::SeqCst);

    let resolved = harness.permission_cache.resolve(&[role_id]).await;

    assert!(resolved.is_ok_and(|resolved| resolved.access.has_permission("audit.read")));
}

#[tokio::test]
async fn storage_failure_is_an_internal_error() {
    let harness = Harness::new();
    let role_id = harness.store.add_role("auditor", RoleScope::System, None).await;
    harness.store.fail_storage.store(true, Ordering::SeqCst);

    let resolved = harness.permission_cache.resolve(&[role_id]).await;

    assert!(matches!(resolved, Err(AppError::Internal(_))));
}

#[tokio::test]
async fn failed_invalidation_aborts_the_write() {
    let harness = Harness::new();
    let role_id = harness.store.add_role("auditor", RoleScope::System, None).await;
    harness.cache.fail_invalidation.store(true, Ordering::SeqCst);
    let written = AtomicBool::new(false);

    let result = harness
        .permission_cache
        .invalidating(&[role_id], async {
            written.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await;

    assert!(matches!(result, Err(AppError::Internal(_))));
    assert!(!written.load(Ordering::SeqCst));
}

#[tokio::test]
async fn invalidating_drops_stale_entry() {
    let harness = Harness::new();
    let role_id = harness.store.add_role("auditor", RoleScope::System, None).await;
    assert!(harness.permission_cache.resolve(&[role_id]).await.is_ok());
    assert!(harness.cache.entries.lock().await.contains_key(&role_id));

    let result = harness
        .permission_cache
        .invalidating(&[role_id], async { Ok(()) })
        .await;

    assert!(result.is_ok());
    assert!(!harness.cache.entries.lock().await.contains_key(&role_id));
}
