use std::{num::NonZeroU64, time::Duration};

pub const TTL_ENV: &str = "INSIGHTS_CACHE_TTL_SECS";
pub const SINGLE_FLIGHT_ENV: &str = "INSIGHTS_CACHE_SINGLE_FLIGHT";

const DEFAULT_TTL_SECS: NonZeroU64 = NonZeroU64::new(30).unwrap();

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ResultCacheConfig {
    /// Lifetime of a stored result. Zero is rejected.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: NonZeroU64,
    /// Collapse concurrent misses for one key into a single computation
    #[serde(default)]
    pub single_flight: bool,
}

impl ResultCacheConfig {
    pub fn ttl(&self) -> Duration { Duration::from_secs(self.ttl_secs.get()) }

    /// Read overrides from `INSIGHTS_CACHE_TTL_SECS` and
    /// `INSIGHTS_CACHE_SINGLE_FLIGHT`. Unset or unparsable values, and a
    /// zero TTL, keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let ttl_secs = lookup(TTL_ENV)
            .and_then(|value| value.trim().parse::<NonZeroU64>().ok())
            .unwrap_or_else(default_ttl_secs);
        let single_flight = lookup(SINGLE_FLIGHT_ENV)
            .map(|value| {
                let value = value.trim();
                value.eq_ignore_ascii_case("true") || value == "1"
            })
            .unwrap_or(false);

        Self {
            ttl_secs,
            single_flight,
        }
    }
}

impl Default for ResultCacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            single_flight: false,
        }
    }
}

fn default_ttl_secs() -> NonZeroU64 { DEFAULT_TTL_SECS }
