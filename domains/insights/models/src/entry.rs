use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache_type::CacheType;

/// Identifier of the team (workspace) that owns a query and its cached
/// result.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct TeamId(pub i64);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TeamId {
    fn from(id: i64) -> Self { Self(id) }
}

/// Parameters a cached result was computed from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CachePayload {
    Trends {
        /// Canonical filter JSON
        filter: String,
        team_id: TeamId,
    },
    Funnel {
        funnel_id: i64,
        team_id: TeamId,
    },
}

impl CachePayload {
    pub fn team_id(&self) -> TeamId {
        match self {
            Self::Trends { team_id, .. } | Self::Funnel { team_id, .. } => {
                *team_id
            }
        }
    }
}

/// What a result cache writes under a key. Always written whole.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub result: T,
    pub details: CachePayload,
    #[serde(rename = "type")]
    pub cache_type: CacheType,
    pub stored_at: DateTime<Utc>,
}
