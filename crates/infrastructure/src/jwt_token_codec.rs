//! HS256 JWT codec for session tokens.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use tenura_application::{SessionClaims, TokenCodec};
use tenura_core::{AppError, AppResult, InstitutionId, RoleId, UserId};

#[cfg(test)]
mod tests;

/// Wire claims of a session token.
#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    sub: String,
    username: String,
    role_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    institution_id: Option<String>,
    iat: i64,
    exp: i64,
}

/// Signs and verifies session tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct JwtTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenCodec {
    /// Creates a codec from the signing secret. An empty secret is rejected.
    pub fn new(secret: &str) -> AppResult<Self> {
        if secret.trim().is_empty() {
            return Err(AppError::Validation(
                "ACCESS_TOKEN_SECRET must not be empty".to_owned(),
            ));
        }

        // Expiry is judged by the token service against an injected clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }
}

impl TokenCodec for JwtTokenCodec {
    fn encode(&self, claims: &SessionClaims) -> AppResult<String> {
        let wire = JwtClaims {
            sub: claims.user_id.to_string(),
            username: claims.username.clone(),
            role_ids: claims.role_ids.iter().map(ToString::to_string).collect(),
            institution_id: claims.institution_id.map(|id| id.to_string()),
            iat: claims.issued_at.timestamp(),
            exp: claims.expires_at.timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &wire, &self.encoding_key)
            .map_err(|error| AppError::Internal(format!("failed to sign token: {error}")))
    }

    fn decode(&self, token: &str) -> AppResult<SessionClaims> {
        let wire = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|error| AppError::Unauthorized(format!("invalid token: {error}")))?
            .claims;

        Ok(SessionClaims {
            user_id: parse_claim::<UserId>(&wire.sub)?,
            username: wire.username,
            role_ids: wire
                .role_ids
                .iter()
                .map(|role_id| parse_claim::<RoleId>(role_id))
                .collect::<AppResult<Vec<_>>>()?,
            institution_id: wire
                .institution_id
                .as_deref()
                .map(parse_claim::<InstitutionId>)
                .transpose()?,
            issued_at: timestamp_claim(wire.iat)?,
            expires_at: timestamp_claim(wire.exp)?,
        })
    }
}

fn parse_claim<T: FromStr>(value: &str) -> AppResult<T> {
    value
        .parse()
        .map_err(|_| AppError::Unauthorized(format!("malformed token claim '{value}'")))
}

fn timestamp_claim(seconds: i64) -> AppResult<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| AppError::Unauthorized("token timestamp is out of range".to_owned()))
}
