use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use insights_errors::InsightsError;
use insights_models::{FunnelResult, InsightQuery, TeamId, refresh_requested};
use tracing::instrument;

use crate::result_cache::ResultCache;

/// Computes step counts for a saved funnel.
#[async_trait]
pub trait FunnelCalculator: Send + Sync {
    async fn calculate(
        &self, funnel_id: i64, team_id: TeamId,
    ) -> Result<FunnelResult, InsightsError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunnelQuery {
    pub funnel_id: i64,
    pub refresh: bool,
}

impl FunnelQuery {
    pub fn from_query_params(
        funnel_id: i64, params: &HashMap<String, String>,
    ) -> Self {
        Self {
            funnel_id,
            refresh: refresh_requested(params),
        }
    }
}

#[derive(Clone)]
pub struct FunnelQueryHandler {
    cache: Arc<ResultCache>,
    calculator: Arc<dyn FunnelCalculator>,
}

impl FunnelQueryHandler {
    pub fn new(
        cache: Arc<ResultCache>, calculator: Arc<dyn FunnelCalculator>,
    ) -> Self {
        Self { cache, calculator }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, query: FunnelQuery, team_id: TeamId,
    ) -> Result<FunnelResult, InsightsError> {
        let insight = InsightQuery::Funnel {
            funnel_id: query.funnel_id,
        };
        let calculator = self.calculator.clone();

        self.cache
            .get_or_compute(&insight, team_id, query.refresh, || {
                async move {
                    calculator.calculate(query.funnel_id, team_id).await
                }
            })
            .await
    }
}
