pub mod config;
pub mod funnel;
pub mod result_cache;
pub mod trends;

pub use config::ResultCacheConfig;
pub use funnel::{FunnelCalculator, FunnelQuery, FunnelQueryHandler};
pub use result_cache::ResultCache;
pub use trends::{TrendsCalculator, TrendsQuery, TrendsQueryHandler};
