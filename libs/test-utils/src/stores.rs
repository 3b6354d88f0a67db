use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use bytes::Bytes;
use redis_connection::{CacheError, CacheResult, CacheStore};

/// Wraps a store and records how often it was touched.
pub struct CountingStore {
    inner: Arc<dyn CacheStore>,
    gets: AtomicUsize,
    sets: AtomicUsize,
    removes: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: Arc<dyn CacheStore>) -> Self {
        Self {
            inner,
            gets: AtomicUsize::new(0),
            sets: AtomicUsize::new(0),
            removes: AtomicUsize::new(0),
        }
    }

    pub fn gets(&self) -> usize { self.gets.load(Ordering::SeqCst) }

    pub fn sets(&self) -> usize { self.sets.load(Ordering::SeqCst) }

    pub fn removes(&self) -> usize { self.removes.load(Ordering::SeqCst) }

    /// Total number of store operations seen
    pub fn interactions(&self) -> usize {
        self.gets() + self.sets() + self.removes()
    }
}

#[async_trait]
impl CacheStore for CountingStore {
    async fn get(&self, key: &str) -> CacheResult<Option<Bytes>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn set(
        &self, key: &str, value: Bytes, ttl: Duration,
    ) -> CacheResult<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value, ttl).await
    }

    async fn remove(&self, key: &str) -> CacheResult<bool> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(key).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    Reads,
    Writes,
    Everything,
}

/// A store that errors on the operations selected by its [`FailureMode`]
/// and forwards the rest to an inner store.
pub struct FailingStore {
    inner: Arc<dyn CacheStore>,
    mode: FailureMode,
}

impl FailingStore {
    pub fn new(inner: Arc<dyn CacheStore>, mode: FailureMode) -> Self {
        Self { inner, mode }
    }

    fn unavailable() -> CacheError {
        CacheError::Backend("store unavailable".to_string())
    }
}

#[async_trait]
impl CacheStore for FailingStore {
    async fn get(&self, key: &str) -> CacheResult<Option<Bytes>> {
        match self.mode {
            FailureMode::Reads | FailureMode::Everything => {
                Err(Self::unavailable())
            }
            FailureMode::Writes => self.inner.get(key).await,
        }
    }

    async fn set(
        &self, key: &str, value: Bytes, ttl: Duration,
    ) -> CacheResult<()> {
        match self.mode {
            FailureMode::Writes | FailureMode::Everything => {
                Err(Self::unavailable())
            }
            FailureMode::Reads => self.inner.set(key, value, ttl).await,
        }
    }

    async fn remove(&self, key: &str) -> CacheResult<bool> {
        match self.mode {
            FailureMode::Everything => Err(Self::unavailable()),
            _ => self.inner.remove(key).await,
        }
    }
}
