use std::{fmt, str::FromStr};

use insights_errors::InsightsError;
use serde::{Deserialize, Serialize};

/// Kind of insight whose result is cached. Decides which parameters feed
/// the cache key and which payload is recorded next to the result.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum CacheType {
    #[serde(rename = "Trends")]
    Trends,
    #[serde(rename = "Funnel")]
    Funnel,
}

impl CacheType {
    pub const ALL: [CacheType; 2] = [CacheType::Trends, CacheType::Funnel];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trends => "Trends",
            Self::Funnel => "Funnel",
        }
    }
}

impl fmt::Display for CacheType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheType {
    type Err = InsightsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| InsightsError::invalid_cache_type(s))
    }
}
