use std::{sync::Arc, time::Duration};

use bytes::Bytes;

/// Cache-specific error type that doesn't depend on Redis
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Invalid TTL: {0}")]
    InvalidTtl(String),

    #[error("Operation not supported: {0}")]
    Unsupported(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

pub(crate) fn ensure_positive_ttl(ttl: Duration) -> CacheResult<()> {
    if ttl.is_zero() {
        return Err(CacheError::InvalidTtl("ttl must be positive".into()));
    }
    Ok(())
}

/// Key-value store sitting behind a result cache.
///
/// Values are opaque bytes; encoding is the caller's concern. Every
/// implementation must be safe to share between concurrent tasks, and a
/// `set` must replace the whole value stored under the key.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// Get the live value for `key`, `None` when absent or expired
    async fn get(&self, key: &str) -> CacheResult<Option<Bytes>>;

    /// Store `value` under `key` for `ttl`, replacing any previous value.
    /// A zero `ttl` is rejected with [`CacheError::InvalidTtl`].
    async fn set(&self, key: &str, value: Bytes, ttl: Duration)
    -> CacheResult<()>;

    /// Remove key from cache
    async fn remove(&self, key: &str) -> CacheResult<bool>;

    /// Check if key exists in cache
    async fn exists(&self, key: &str) -> CacheResult<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Clear all entries (optional operation)
    async fn clear(&self) -> CacheResult<()> {
        Err(CacheError::Unsupported(
            "Clear operation not supported by this cache implementation"
                .to_string(),
        ))
    }
}

#[async_trait::async_trait]
impl<T> CacheStore for Arc<T>
where
    T: CacheStore + ?Sized,
{
    async fn get(&self, key: &str) -> CacheResult<Option<Bytes>> {
        (**self).get(key).await
    }

    async fn set(
        &self, key: &str, value: Bytes, ttl: Duration,
    ) -> CacheResult<()> {
        (**self).set(key, value, ttl).await
    }

    async fn remove(&self, key: &str) -> CacheResult<bool> {
        (**self).remove(key).await
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        (**self).exists(key).await
    }

    async fn clear(&self) -> CacheResult<()> { (**self).clear().await }
}
