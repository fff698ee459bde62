//! Redis-backed access cache shared across API instances.

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use tenura_application::AccessCache;
use tenura_core::{AppError, AppResult, RoleId};
use tenura_domain::AccessMap;

/// Redis implementation of the access cache port. Values are JSON encoded
/// access maps keyed by role id.
#[derive(Clone)]
pub struct RedisAccessCache {
    client: redis::Client,
    key_prefix: String,
    ttl_seconds: Option<u64>,
}

impl RedisAccessCache {
    /// Creates a cache adapter with a configured Redis client, key prefix and
    /// optional entry lifetime.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>, ttl_seconds: Option<u64>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
            ttl_seconds: ttl_seconds.filter(|seconds| *seconds > 0),
        }
    }

    fn key_for(&self, role_id: RoleId) -> String {
        format!("{}:role={role_id}", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
    }
}

#[async_trait]
impl AccessCache for RedisAccessCache {
    async fn get(&self, role_id: RoleId) -> AppResult<Option<AccessMap>> {
        let mut connection = self.connection().await?;
        let encoded: Option<String> = connection
            .get(self.key_for(role_id))
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to read access cache entry: {error}"))
            })?;

        encoded
            .as_deref()
            .map(|value| decode_entry(role_id, value))
            .transpose()
    }

    async fn put(&self, role_id: RoleId, access: &AccessMap) -> AppResult<()> {
        let value = encode_entry(access)?;
        let key = self.key_for(role_id);
        let mut connection = self.connection().await?;

        let written = match self.ttl_seconds {
            Some(ttl_seconds) => connection.set_ex::<_, _, ()>(key, value, ttl_seconds).await,
            None => connection.set::<_, _, ()>(key, value).await,
        };
        written.map_err(|error| {
            AppError::Internal(format!("failed to write access cache entry: {error}"))
        })
    }

    async fn invalidate(&self, role_id: RoleId) -> AppResult<()> {
        let mut connection = self.connection().await?;
        let removed: u64 = connection
            .del(self.key_for(role_id))
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to invalidate access cache entry: {error}"))
            })?;
        debug!(%role_id, removed, "invalidated access cache entry");
        Ok(())
    }
}

fn encode_entry(access: &AccessMap) -> AppResult<String> {
    serde_json::to_string(access)
        .map_err(|error| AppError::Internal(format!("failed to encode access cache entry: {error}")))
}

fn decode_entry(role_id: RoleId, value: &str) -> AppResult<AccessMap> {
    serde_json::from_str(value).map_err(|error| {
        AppError::Internal(format!(
            "invalid access cache entry for role '{role_id}': {error}"
        ))
    })
}
