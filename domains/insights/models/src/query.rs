use std::collections::HashMap;

use insights_errors::InsightsError;

use crate::{cache_type::CacheType, filter::Filter};

/// A cacheable insight query: the cache type together with the
/// parameters that identify its result.
#[derive(Clone, Debug, PartialEq)]
pub enum InsightQuery {
    Trends(Filter),
    Funnel { funnel_id: i64 },
}

impl InsightQuery {
    pub fn cache_type(&self) -> CacheType {
        match self {
            Self::Trends(_) => CacheType::Trends,
            Self::Funnel { .. } => CacheType::Funnel,
        }
    }

    /// Build a query from an untyped cache type name, request parameters
    /// and an optional path id.
    pub fn from_parts(
        cache_type: &str, params: &HashMap<String, String>, pk: Option<i64>,
    ) -> Result<Self, InsightsError> {
        match cache_type.parse::<CacheType>()? {
            CacheType::Trends => {
                Ok(Self::Trends(Filter::from_query_params(params)?))
            }
            CacheType::Funnel => {
                let funnel_id = pk.ok_or(InsightsError::MissingFunnelId)?;
                Ok(Self::Funnel { funnel_id })
            }
        }
    }
}

/// Whether the request asked to bypass cached results.
///
/// Any non-empty `refresh` value counts except `false` and `0`.
pub fn refresh_requested(params: &HashMap<String, String>) -> bool {
    params
        .get("refresh")
        .map(|value| value.trim())
        .is_some_and(|value| {
            !value.is_empty()
                && !value.eq_ignore_ascii_case("false")
                && value != "0"
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_parts_trends() {
        let query = InsightQuery::from_parts(
            "Trends",
            &params(&[("date_from", "-7d")]),
            None,
        )
        .unwrap();

        assert_eq!(query.cache_type(), CacheType::Trends);
        match query {
            InsightQuery::Trends(filter) => {
                assert_eq!(filter.date_from.as_deref(), Some("-7d"));
            }
            other => panic!("Expected trends query, got {other:?}"),
        }
    }

    #[test]
    fn test_from_parts_funnel() {
        let query =
            InsightQuery::from_parts("Funnel", &HashMap::new(), Some(7))
                .unwrap();
        assert_eq!(query, InsightQuery::Funnel { funnel_id: 7 });
    }

    #[test]
    fn test_from_parts_funnel_requires_pk() {
        let err = InsightQuery::from_parts("Funnel", &HashMap::new(), None)
            .unwrap_err();
        assert_eq!(err, InsightsError::MissingFunnelId);
    }

    #[test]
    fn test_from_parts_unknown_type() {
        let err = InsightQuery::from_parts("Cohort", &HashMap::new(), Some(1))
            .unwrap_err();
        assert_eq!(err, InsightsError::invalid_cache_type("Cohort"));
    }

    #[test]
    fn test_refresh_flag() {
        assert!(!refresh_requested(&params(&[])));
        assert!(!refresh_requested(&params(&[("refresh", "")])));
        assert!(!refresh_requested(&params(&[("refresh", "false")])));
        assert!(!refresh_requested(&params(&[("refresh", "0")])));
        assert!(refresh_requested(&params(&[("refresh", "true")])));
        assert!(refresh_requested(&params(&[("refresh", "1")])));
    }
}
