use deadpool_redis::{Config, Pool, Runtime};
pub use deadpool_redis::{CreatePoolError, PoolError};
pub use redis::RedisError;
use tracing::{info, instrument};
use url::Url;
pub mod cache;
pub mod clock;
pub mod config;
pub mod core;

pub use cache::{
    CacheError, CacheResult, CacheStore, Memory, RedisCache,
};
pub use clock::{Clock, SystemClock};

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Invalid Redis url: {0}")]
    Url(String),
    #[error("Failed to create Redis pool: {0}")]
    Pool(#[from] CreatePoolError),
}

/// Builds the `redis://host:port/db` url for a connection config.
pub fn redis_url<C>(config: &C) -> Result<Url, ConnectError>
where
    C: config::DbConnectConfig,
{
    let mut url = Url::parse("redis://")
        .map_err(|e| ConnectError::Url(e.to_string()))?;

    url.set_host(Some(config.host()))
        .map_err(|e| ConnectError::Url(e.to_string()))?;
    url.set_port(config.port().into())
        .map_err(|_| ConnectError::Url("cannot set port".into()))?;
    url.path_segments_mut()
        .map_err(|_| ConnectError::Url("cannot-be-a-base url".into()))?
        .extend(&[config.db().to_string()]);

    Ok(url)
}

#[instrument(skip_all, name = "connect-redis")]
pub async fn connect_redis_db<C>(config: &C) -> Result<Pool, ConnectError>
where
    C: config::DbConnectConfig,
{
    let url = redis_url(config)?;

    info!(redis.url = %url, redis.connect = true);

    let cfg = Config {
        url: Some(url.to_string()),
        pool: Some(deadpool_redis::PoolConfig::default()),
        connection: None,
    };

    let pool = cfg.create_pool(Some(Runtime::Tokio1))?;
    Ok(pool)
}
