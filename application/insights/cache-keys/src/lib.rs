use std::{collections::HashMap, fmt};

use insights_errors::InsightsError;
use insights_models::{CachePayload, InsightQuery, TeamId};
use sha2::{Digest, Sha256};

pub const CACHE_KEY_PREFIX: &str = "cache_";

/// Store key for one cached insight result: `cache_` followed by the hex
/// SHA-256 of the query's raw identity string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InsightCacheKey(String);

impl InsightCacheKey {
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for InsightCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for InsightCacheKey {
    fn as_ref(&self) -> &str { &self.0 }
}

/// Key plus the payload recorded next to the result under that key.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheIdentity {
    pub key: InsightCacheKey,
    pub payload: CachePayload,
}

impl CacheIdentity {
    pub fn for_query(
        query: &InsightQuery, team_id: TeamId,
    ) -> Result<Self, InsightsError> {
        let (raw, payload) = match query {
            InsightQuery::Trends(filter) => {
                let filter = filter.to_canonical_json()?;
                (format!("{filter}_{team_id}"), CachePayload::Trends {
                    filter,
                    team_id,
                })
            }
            InsightQuery::Funnel { funnel_id } => {
                (
                    format!("funnel_{funnel_id}_{team_id}"),
                    CachePayload::Funnel {
                        funnel_id: *funnel_id,
                        team_id,
                    },
                )
            }
        };

        Ok(Self {
            key: generate_cache_key(&raw),
            payload,
        })
    }
}

pub fn generate_cache_key(raw: &str) -> InsightCacheKey {
    let digest = Sha256::digest(raw.as_bytes());
    InsightCacheKey(format!("{CACHE_KEY_PREFIX}{}", hex::encode(digest)))
}

pub fn derive_key(
    query: &InsightQuery, team_id: TeamId,
) -> Result<InsightCacheKey, InsightsError> {
    CacheIdentity::for_query(query, team_id).map(|identity| identity.key)
}

/// Key derivation for untyped input. Unknown cache types are rejected
/// with [`InsightsError::InvalidCacheType`].
pub fn derive_key_for(
    cache_type: &str, params: &HashMap<String, String>, pk: Option<i64>,
    team_id: TeamId,
) -> Result<InsightCacheKey, InsightsError> {
    let query = InsightQuery::from_parts(cache_type, params, pk)?;
    derive_key(&query, team_id)
}
