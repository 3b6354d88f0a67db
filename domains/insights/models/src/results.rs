use serde::{Deserialize, Serialize};

use crate::cacheable::Cacheable;

/// One line of a trends graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub label: String,
    pub count: f64,
    pub data: Vec<f64>,
    pub labels: Vec<String>,
    pub days: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown_value: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelStep {
    pub action_id: String,
    pub name: String,
    pub order: u32,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelResult {
    pub id: i64,
    pub name: String,
    pub steps: Vec<FunnelStep>,
}

impl Cacheable for TrendSeries {}

impl Cacheable for FunnelResult {
    fn is_cacheable(&self) -> bool { !self.steps.is_empty() }
}
