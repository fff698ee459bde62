use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use tenura_application::{TokenCodec, TokenService};
use tenura_core::{AppError, InstitutionId, RoleId, UserId, UserIdentity};

use super::JwtTokenCodec;

const SECRET: &str = "unit-test-signing-secret";

fn issued_at() -> DateTime<Utc> {
    DateTime::from_timestamp(1_760_000_000, 0).unwrap_or_else(|| panic!("valid instant"))
}

fn identity() -> UserIdentity {
    UserIdentity::new(
        UserId::new(),
        "alice",
        vec![RoleId::new(), RoleId::new()],
        Some(InstitutionId::new()),
    )
}

fn tokens(secret: &str) -> TokenService {
    let codec = JwtTokenCodec::new(secret).unwrap_or_else(|_| panic!("valid secret"));
    TokenService::new(Arc::new(codec), 24).unwrap_or_else(|_| panic!("valid lifetime"))
}

#[test]
fn empty_secret_is_rejected() {
    assert!(matches!(
        JwtTokenCodec::new("  "),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn token_is_accepted_until_the_expiry_second() {
    let tokens = tokens(SECRET);
    let identity = identity();
    let issued = tokens
        .issue(&identity, false, issued_at())
        .unwrap_or_else(|_| panic!("token issued"));

    assert_eq!(issued.expires_at, issued_at() + TimeDelta::hours(24));
    let just_before = issued.expires_at - TimeDelta::seconds(1);
    assert_eq!(tokens.verify(&issued.token, just_before).ok(), Some(identity));
    assert!(matches!(
        tokens.verify(&issued.token, issued.expires_at),
        Err(AppError::Unauthorized(_))
    ));
}

#[test]
fn sub_second_issue_time_is_truncated() {
    let tokens = tokens(SECRET);
    let now = issued_at() + TimeDelta::milliseconds(750);
    let issued = tokens
        .issue(&identity(), false, now)
        .unwrap_or_else(|_| panic!("token issued"));

    assert_eq!(issued.expires_at, issued_at() + TimeDelta::hours(24));
}

#[test]
fn tampered_signature_is_rejected() {
    let tokens = tokens(SECRET);
    let issued = tokens
        .issue(&identity(), false, issued_at())
        .unwrap_or_else(|_| panic!("token issued"));

    let signature_start = issued
        .token
        .rfind('.')
        .unwrap_or_else(|| panic!("three segments"))
        + 1;
    let mut bytes = issued.token.into_bytes();
    let position = signature_start + 5;
    bytes[position] = if bytes[position] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(bytes).unwrap_or_else(|_| panic!("ascii token"));

    assert!(matches!(
        tokens.verify(&tampered, issued_at()),
        Err(AppError::Unauthorized(_))
    ));
}

#[test]
fn token_signed_with_another_key_is_rejected() {
    let issued = tokens("previous-secret")
        .issue(&identity(), false, issued_at())
        .unwrap_or_else(|_| panic!("token issued"));

    assert!(matches!(
        tokens(SECRET).verify(&issued.token, issued_at()),
        Err(AppError::Unauthorized(_))
    ));
}

#[test]
fn logout_token_is_expired_at_issue() {
    let tokens = tokens(SECRET);
    let issued = tokens
        .issue(&identity(), true, issued_at())
        .unwrap_or_else(|_| panic!("token issued"));

    assert_eq!(issued.expires_at, issued_at());
    assert!(tokens.verify(&issued.token, issued_at()).is_err());
}

#[test]
fn unbound_identity_round_trips_without_institution() {
    let codec = JwtTokenCodec::new(SECRET).unwrap_or_else(|_| panic!("valid secret"));
    let tokens = TokenService::new(Arc::new(codec.clone()), 1)
        .unwrap_or_else(|_| panic!("valid lifetime"));
    let identity = UserIdentity::new(UserId::new(), "root", vec![RoleId::new()], None);
    let issued = tokens
        .issue(&identity, false, issued_at())
        .unwrap_or_else(|_| panic!("token issued"));

    let claims = codec
        .decode(&issued.token)
        .unwrap_or_else(|_| panic!("token decoded"));

    assert_eq!(claims.institution_id, None);
    assert_eq!(claims.issued_at, issued_at());
    assert_eq!(claims.identity(), identity);
}

#[test]
fn garbage_is_unauthorized() {
    let codec = JwtTokenCodec::new(SECRET).unwrap_or_else(|_| panic!("valid secret"));
    assert!(matches!(
        codec.decode("not-a-token"),
        Err(AppError::Unauthorized(_))
    ));
}
