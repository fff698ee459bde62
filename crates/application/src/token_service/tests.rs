use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use tenura_core::{AppError, InstitutionId, RoleId, UserId, UserIdentity};

use crate::test_support::FakeTokenCodec;

use super::TokenService;

fn fixed_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_760_000_000, 250_000_000).unwrap_or_else(|| panic!("valid instant"))
}

fn identity() -> UserIdentity {
    UserIdentity::new(
        UserId::new(),
        "alice",
        vec![RoleId::new()],
        Some(InstitutionId::new()),
    )
}

fn service() -> TokenService {
    TokenService::new(Arc::new(FakeTokenCodec::default()), 8)
        .unwrap_or_else(|_| panic!("valid token service"))
}

#[test]
fn zero_lifetime_is_rejected_at_construction() {
    let result = TokenService::new(Arc::new(FakeTokenCodec::default()), 0);
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[test]
fn expiry_is_issue_second_plus_lifetime() {
    let issued = service()
        .issue(&identity(), false, fixed_now())
        .unwrap_or_else(|_| panic!("issued"));

    let expected = DateTime::from_timestamp(1_760_000_000, 0)
        .unwrap_or_else(|| panic!("valid instant"))
        + TimeDelta::hours(8);
    assert_eq!(issued.expires_at, expected);
}

#[test]
fn token_verifies_until_expiry_and_not_after() {
    let service = service();
    let identity = identity();
    let issued = service
        .issue(&identity, false, fixed_now())
        .unwrap_or_else(|_| panic!("issued"));

    let just_before = issued.expires_at - TimeDelta::milliseconds(1);
    assert_eq!(
        service.verify(&issued.token, just_before).ok(),
        Some(identity)
    );

    let at_expiry = service.verify(&issued.token, issued.expires_at);
    assert!(matches!(at_expiry, Err(AppError::Unauthorized(_))));

    let later = service.verify(&issued.token, issued.expires_at + TimeDelta::days(1));
    assert!(matches!(later, Err(AppError::Unauthorized(_))));
}

#[test]
fn logout_token_is_already_expired() {
    let service = service();
    let issued = service
        .issue(&identity(), true, fixed_now())
        .unwrap_or_else(|_| panic!("issued"));

    assert!(issued.expires_at <= fixed_now());
    assert!(matches!(
        service.verify(&issued.token, fixed_now()),
        Err(AppError::Unauthorized(_))
    ));
}

#[test]
fn unknown_token_is_unauthorized() {
    let result = service().verify("not-a-token", fixed_now());
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}
