use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InsightsError {
    #[error("Invalid cache type: {cache_type}")]
    InvalidCacheType { cache_type: String },
    #[error("Invalid filter parameter `{param}`: {reason}")]
    InvalidFilter { param: String, reason: String },
    #[error("Funnel queries require a funnel id")]
    MissingFunnelId,
    #[error("Funnel not found: {funnel_id}")]
    FunnelNotFound { funnel_id: i64 },
    #[error("Cache store error: {0}")]
    Store(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Calculation failed: {0}")]
    Calculation(String),
}

impl InsightsError {
    pub fn invalid_cache_type(cache_type: impl Into<String>) -> Self {
        Self::InvalidCacheType {
            cache_type: cache_type.into(),
        }
    }

    pub fn invalid_filter(
        param: impl Into<String>, reason: impl ToString,
    ) -> Self {
        Self::InvalidFilter {
            param: param.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_cache_type_message() {
        let err = InsightsError::invalid_cache_type("Cohort");
        assert_eq!(err.to_string(), "Invalid cache type: Cohort");
    }

    #[test]
    fn test_invalid_filter_message() {
        let err = InsightsError::invalid_filter("events", "expected a list");
        assert_eq!(
            err.to_string(),
            "Invalid filter parameter `events`: expected a list"
        );
    }
}
