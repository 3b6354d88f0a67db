use std::{future::Future, sync::Arc, time::Duration};

use insights_cache_keys::{CacheIdentity, InsightCacheKey};
use insights_errors::InsightsError;
use insights_models::{
    CacheEntry, CacheType, Cacheable, InsightQuery, TeamId,
};
use moka::future::Cache;
use redis_connection::{
    CacheStore, Clock, SystemClock,
    core::{CacheValue, Json, encode},
};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::config::ResultCacheConfig;

const IN_FLIGHT_IDLE: Duration = Duration::from_secs(300);

/// Memoizes expensive insight computations in a [`CacheStore`].
///
/// Freshness is purely time based: a stored result is served until its
/// TTL runs out, unless the caller asks to bypass it. Failed computations
/// and empty results are never stored.
pub struct ResultCache {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    config: ResultCacheConfig,
    in_flight: Cache<String, Arc<Mutex<()>>>,
}

impl ResultCache {
    pub fn new(
        store: Arc<dyn CacheStore>, config: ResultCacheConfig,
    ) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            config,
            in_flight: Cache::builder().time_to_idle(IN_FLIGHT_IDLE).build(),
        }
    }

    /// Clock used to stamp `stored_at` on new entries
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Serve `query` from the store, or run `compute` and store what it
    /// returns.
    ///
    /// With `bypass` set the lookup is skipped and the fresh result
    /// replaces whatever was stored. Errors from `compute` are returned
    /// as-is and leave the store untouched.
    #[instrument(
        skip(self, query, team_id, compute),
        fields(cache_type = %query.cache_type(), team_id = %team_id)
    )]
    pub async fn get_or_compute<A, E, F, Fut>(
        &self, query: &InsightQuery, team_id: TeamId, bypass: bool,
        compute: F,
    ) -> Result<A, E>
    where
        A: Serialize + DeserializeOwned + Cacheable + Send + Sync,
        E: From<InsightsError>,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<A, E>> + Send,
    {
        let identity = CacheIdentity::for_query(query, team_id)?;

        if !bypass {
            if let Some(hit) = self.lookup(&identity.key).await {
                return Ok(hit);
            }
        }

        if !self.config.single_flight {
            return self
                .compute_and_store(query.cache_type(), identity, compute)
                .await;
        }

        let lock = self
            .in_flight
            .get_with(identity.key.to_string(), async {
                Arc::new(Mutex::new(()))
            })
            .await;
        let _guard = lock.lock().await;

        // Whoever held the lock before us may have filled the entry.
        if !bypass {
            if let Some(hit) = self.lookup(&identity.key).await {
                return Ok(hit);
            }
        }

        self.compute_and_store(query.cache_type(), identity, compute)
            .await
    }

    /// [`ResultCache::get_or_compute`] for an untyped cache type name.
    /// Unknown names fail with [`InsightsError::InvalidCacheType`] before
    /// the store is consulted.
    pub async fn get_or_compute_raw<A, E, F, Fut>(
        &self, cache_type: &str,
        params: &std::collections::HashMap<String, String>, pk: Option<i64>,
        team_id: TeamId, bypass: bool, compute: F,
    ) -> Result<A, E>
    where
        A: Serialize + DeserializeOwned + Cacheable + Send + Sync,
        E: From<InsightsError>,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<A, E>> + Send,
    {
        let query = InsightQuery::from_parts(cache_type, params, pk)?;
        self.get_or_compute(&query, team_id, bypass, compute).await
    }

    /// Drop the stored result for `query`, if any.
    pub async fn invalidate(
        &self, query: &InsightQuery, team_id: TeamId,
    ) -> Result<bool, InsightsError> {
        let identity = CacheIdentity::for_query(query, team_id)?;
        self.store
            .remove(identity.key.as_str())
            .await
            .map_err(|e| InsightsError::Store(e.to_string()))
    }

    async fn lookup<A>(&self, key: &InsightCacheKey) -> Option<A>
    where
        A: Serialize + DeserializeOwned + Send + Sync,
    {
        let bytes = match self.store.get(key.as_str()).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!("Cache miss for {}", key);
                return None;
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "Cache read failed for {}, recomputing", key
                );
                return None;
            }
        };

        match Json::<CacheEntry<A>>::from_bytes(&bytes) {
            Ok(entry) => {
                debug!("Cache hit for {}", key);
                Some(entry.inner().result)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "Undecodable cache entry {}, recomputing", key
                );
                None
            }
        }
    }

    async fn compute_and_store<A, E, F, Fut>(
        &self, cache_type: CacheType, identity: CacheIdentity, compute: F,
    ) -> Result<A, E>
    where
        A: Serialize + Cacheable,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<A, E>>,
    {
        let result = compute().await?;

        if !result.is_cacheable() {
            debug!("Empty result for {}, not caching", identity.key);
            return Ok(result);
        }

        let entry = CacheEntry {
            result: &result,
            details: identity.payload,
            cache_type,
            stored_at: self.clock.now(),
        };

        match encode(&entry) {
            Ok(bytes) => {
                if let Err(e) = self
                    .store
                    .set(identity.key.as_str(), bytes, self.config.ttl())
                    .await
                {
                    warn!(
                        error = %e,
                        "Cache write failed for {}", identity.key
                    );
                }
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "Could not encode result for {}", identity.key
                );
            }
        }

        Ok(result)
    }
}
