//! Request/response models for the /metrics endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{metric_identities, metric_values, sea_orm_active_enums::MetricType};
use crate::services::metric_ranking::MetricRank;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricSummary {
    pub id: i32,
    pub ticker: String,
    pub metric_type: MetricType,
}

impl From<metric_identities::Model> for MetricSummary {
    fn from(identity: metric_identities::Model) -> Self {
        Self {
            id: identity.id,
            ticker: identity.ticker,
            metric_type: identity.metric_type,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsListResponse {
    pub metrics: Vec<MetricSummary>,
}

/// One point of the 24h history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl From<metric_values::Model> for MetricHistoryEntry {
    fn from(value: metric_values::Model) -> Self {
        Self {
            timestamp: value.timestamp,
            value: value.value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricDetailResponse {
    pub id: i32,
    pub ticker: String,
    pub metric_type: MetricType,
    pub metric_24h_history: Vec<MetricHistoryEntry>,
    pub standard_deviation: f64,
    /// `"{rank}/{total}"`
    pub metric_rank: String,
}

impl From<MetricRank> for MetricDetailResponse {
    fn from(ranked: MetricRank) -> Self {
        let metric_rank = ranked.rank_label();
        Self {
            id: ranked.identity.id,
            ticker: ranked.identity.ticker,
            metric_type: ranked.identity.metric_type,
            metric_24h_history: ranked.history.into_iter().map(Into::into).collect(),
            standard_deviation: ranked.standard_deviation,
            metric_rank,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
