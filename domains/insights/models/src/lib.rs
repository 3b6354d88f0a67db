pub mod cache_type;
pub mod cacheable;
pub mod entry;
pub mod filter;
pub mod query;
pub mod results;

pub use cache_type::CacheType;
pub use cacheable::Cacheable;
pub use entry::{CacheEntry, CachePayload, TeamId};
pub use filter::{Entity, EntityId, EntityType, Filter, Property};
pub use insights_errors::InsightsError;
pub use query::{InsightQuery, refresh_requested};
pub use results::{FunnelResult, FunnelStep, TrendSeries};
