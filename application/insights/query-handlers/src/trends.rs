use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use insights_errors::InsightsError;
use insights_models::{
    Filter, InsightQuery, TeamId, TrendSeries, refresh_requested,
};
use tracing::instrument;

use crate::result_cache::ResultCache;

/// Runs the actual trends aggregation against the event store.
#[async_trait]
pub trait TrendsCalculator: Send + Sync {
    async fn calculate(
        &self, filter: &Filter, team_id: TeamId,
    ) -> Result<Vec<TrendSeries>, InsightsError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendsQuery {
    pub filter: Filter,
    pub refresh: bool,
}

impl TrendsQuery {
    pub fn from_query_params(
        params: &HashMap<String, String>,
    ) -> Result<Self, InsightsError> {
        Ok(Self {
            filter: Filter::from_query_params(params)?,
            refresh: refresh_requested(params),
        })
    }
}

#[derive(Clone)]
pub struct TrendsQueryHandler {
    cache: Arc<ResultCache>,
    calculator: Arc<dyn TrendsCalculator>,
}

impl TrendsQueryHandler {
    pub fn new(
        cache: Arc<ResultCache>, calculator: Arc<dyn TrendsCalculator>,
    ) -> Self {
        Self { cache, calculator }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, query: TrendsQuery, team_id: TeamId,
    ) -> Result<Vec<TrendSeries>, InsightsError> {
        let filter = query.filter;
        let insight = InsightQuery::Trends(filter.clone());
        let calculator = self.calculator.clone();

        self.cache
            .get_or_compute(&insight, team_id, query.refresh, || {
                async move { calculator.calculate(&filter, team_id).await }
            })
            .await
    }
}
