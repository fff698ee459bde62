use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use tenura_application::AccessCache;
use tenura_core::{AppResult, RoleId};
use tenura_domain::AccessMap;


#[derive(Debug, Clone)]
struct AccessCacheEntry {
    access: AccessMap,
    expires_at: Option<Instant>,
}

impl AccessCacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}

/// Process-local access cache keyed by role id.
#[derive(Default)]
pub struct InMemoryAccessCache {
    entries: RwLock<HashMap<RoleId, AccessCacheEntry>>,
    time_to_live: Option<Duration>,
}

impl InMemoryAccessCache {
    /// Creates a cache whose entries live until invalidated.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache whose entries also expire after `time_to_live`.
    #[must_use]
    pub fn with_time_to_live(time_to_live: Duration) -> Self {
        Self {
            entries: RwLock::default(),
            time_to_live: Some(time_to_live),
        }
    }
}

#[async_trait]
impl AccessCache for InMemoryAccessCache {
    async fn get(&self, role_id: RoleId) -> AppResult<Option<AccessMap>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(&role_id) {
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.access.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(&role_id).is_some_and(|entry| !entry.is_live(now)) {
            entries.remove(&role_id);
        }

        Ok(None)
    }

    async fn put(&self, role_id: RoleId, access: &AccessMap) -> AppResult<()> {
        let now = Instant::now();
        let expires_at = self
            .time_to_live
            .map(|time_to_live| now.checked_add(time_to_live).unwrap_or(now));

        self.entries.write().await.insert(
            role_id,
            AccessCacheEntry {
                access: access.clone(),
                expires_at,
            },
        );

        Ok(())
    }

    async fn invalidate(&self, role_id: RoleId) -> AppResult<()> {
        self.entries.write().await.remove(&role_id);
        Ok(())
    }
}
