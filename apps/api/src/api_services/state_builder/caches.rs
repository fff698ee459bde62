use std::sync::Arc;
use std::time::Duration;

use tenura_application::AccessCache;
use tenura_core::{AppError, AppResult};
use tenura_infrastructure::{InMemoryAccessCache, RedisAccessCache};
use tracing::info;

use crate::api_config::{AccessCacheBackend, ApiConfig};

pub fn build_access_cache(
    config: &ApiConfig,
    redis_client: Option<redis::Client>,
) -> AppResult<Arc<dyn AccessCache>> {
    info!(
        backend = ?config.access_cache_backend,
        ttl_seconds = ?config.access_cache_ttl_seconds,
        "configuring access cache"
    );

    match config.access_cache_backend {
        AccessCacheBackend::InMemory => Ok(match config.access_cache_ttl_seconds {
            Some(seconds) => Arc::new(InMemoryAccessCache::with_time_to_live(
                Duration::from_secs(seconds),
            )),
            None => Arc::new(InMemoryAccessCache::new()),
        }),
        AccessCacheBackend::Redis => {
            let redis_client = redis_client.ok_or_else(|| {
                AppError::Validation(
                    "REDIS_URL is required when ACCESS_CACHE_BACKEND=redis".to_owned(),
                )
            })?;
            Ok(Arc::new(RedisAccessCache::new(
                redis_client,
                config.access_cache_key_prefix.clone(),
                config.access_cache_ttl_seconds,
            )))
        }
    }
}
