use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};
use moka::{Expiry, future::Cache};
use tracing::{instrument, trace};

use super::r#trait::{
    CacheError, CacheResult, CacheStore, ensure_positive_ttl,
};
use crate::{
    clock::{Clock, SystemClock},
    config::MemoryConfig,
};

#[derive(Clone)]
struct StoredValue {
    bytes: Bytes,
    ttl: Duration,
    expires_at: DateTime<Utc>,
}

/// Hands moka the TTL each value was written with.
struct PerEntryTtl;

impl Expiry<String, StoredValue> for PerEntryTtl {
    fn expire_after_create(
        &self, _key: &String, value: &StoredValue, _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self, _key: &String, value: &StoredValue, _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process store backed by moka.
///
/// moka evicts values physically once their TTL runs out, but freshness
/// is decided against the injected [`Clock`] on every read, so an entry
/// past its `expires_at` is reported as a miss even if moka still holds
/// it.
#[derive(Clone)]
pub struct Memory {
    memory: Cache<String, StoredValue>,
    clock: Arc<dyn Clock>,
}

impl Memory {
    pub fn new(config: MemoryConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: MemoryConfig, clock: Arc<dyn Clock>) -> Self {
        let memory = Cache::builder()
            .max_capacity(config.capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { memory, clock }
    }
}

impl Default for Memory {
    fn default() -> Self { Self::new(MemoryConfig::default()) }
}

#[async_trait]
impl CacheStore for Memory {
    #[instrument(skip(self), level = "trace")]
    async fn get(&self, key: &str) -> CacheResult<Option<Bytes>> {
        match self.memory.get(key).await {
            Some(stored) if stored.expires_at > self.clock.now() => {
                Ok(Some(stored.bytes))
            }
            Some(_) => {
                trace!("Dropping expired entry {}", key);
                self.memory.invalidate(key).await;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, value), level = "trace")]
    async fn set(
        &self, key: &str, value: Bytes, ttl: Duration,
    ) -> CacheResult<()> {
        ensure_positive_ttl(ttl)?;
        let delta = TimeDelta::from_std(ttl)
            .map_err(|e| CacheError::InvalidTtl(e.to_string()))?;
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(delta)
            .ok_or_else(|| {
                CacheError::InvalidTtl(format!("{ttl:?} overflows the clock"))
            })?;

        self.memory
            .insert(
                key.to_string(),
                StoredValue {
                    bytes: value,
                    ttl,
                    expires_at,
                },
            )
            .await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> CacheResult<bool> {
        Ok(self.memory.remove(key).await.is_some())
    }

    async fn clear(&self) -> CacheResult<()> {
        self.memory.invalidate_all();
        Ok(())
    }
}
