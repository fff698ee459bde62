use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use tenura_core::{AppError, AppResult, InstitutionId, RoleId, UserId, UserIdentity};

#[cfg(test)]
mod tests;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    /// Token subject.
    pub user_id: UserId,
    /// Display name.
    pub username: String,
    /// Role set, possibly a singleton.
    pub role_ids: Vec<RoleId>,
    /// Tenant binding, `None` when unbound.
    pub institution_id: Option<InstitutionId>,
    /// Issue instant, whole seconds.
    pub issued_at: DateTime<Utc>,
    /// Instant from which the token is rejected, whole seconds.
    pub expires_at: DateTime<Utc>,
}

impl SessionClaims {
    /// Returns the identity carried by the claims.
    #[must_use]
    pub fn identity(&self) -> UserIdentity {
        UserIdentity::new(
            self.user_id,
            self.username.clone(),
            self.role_ids.clone(),
            self.institution_id,
        )
    }
}

/// Port for signing and decoding session tokens.
pub trait TokenCodec: Send + Sync {
    /// Signs claims into a bearer token.
    fn encode(&self, claims: &SessionClaims) -> AppResult<String>;

    /// Checks the signature and returns the embedded claims. Expiry is not
    /// evaluated here.
    fn decode(&self, token: &str) -> AppResult<SessionClaims>;
}

/// Signed token and its absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Bearer token.
    pub token: String,
    /// Instant from which the token is rejected.
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct TokenService {
    codec: Arc<dyn TokenCodec>,
    time_to_live: TimeDelta,
}

impl TokenService {
    /// Creates a token service with a lifetime in hours.
    pub fn new(codec: Arc<dyn TokenCodec>, ttl_hours: u32) -> AppResult<Self> {
        if ttl_hours == 0 {
            return Err(AppError::Validation(
                "token lifetime must be at least one hour".to_owned(),
            ));
        }

        Ok(Self {
            codec,
            time_to_live: TimeDelta::hours(i64::from(ttl_hours)),
        })
    }

    /// Mints a token for the identity. A logout token expires at issue time.
    pub fn issue(
        &self,
        identity: &UserIdentity,
        logout: bool,
        now: DateTime<Utc>,
    ) -> AppResult<IssuedToken> {
        let issued_at = truncate_to_seconds(now)?;
        let expires_at = if logout {
            issued_at
        } else {
            issued_at
                .checked_add_signed(self.time_to_live)
                .ok_or_else(|| AppError::Internal("token expiry overflowed".to_owned()))?
        };

        let claims = SessionClaims {
            user_id: identity.user_id(),
            username: identity.username().to_owned(),
            role_ids: identity.role_ids().to_vec(),
            institution_id: identity.institution_id(),
            issued_at,
            expires_at,
        };

        Ok(IssuedToken {
            token: self.codec.encode(&claims)?,
            expires_at,
        })
    }

    /// Verifies a bearer token at `now` and returns its identity.
    ///
    /// A token is rejected from its expiry instant onward, without leeway.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> AppResult<UserIdentity> {
        let claims = self.codec.decode(token)?;
        if now >= claims.expires_at {
            return Err(AppError::Unauthorized("token has expired".to_owned()));
        }

        Ok(claims.identity())
    }
}

fn truncate_to_seconds(instant: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
    DateTime::from_timestamp(instant.timestamp(), 0)
        .ok_or_else(|| AppError::Internal("issue time is out of range".to_owned()))
}
