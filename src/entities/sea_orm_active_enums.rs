//! `SeaORM` active enums shared by the metric tables

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of observation tracked for a ticker
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    #[sea_orm(string_value = "price")]
    Price,
    #[sea_orm(string_value = "volume")]
    Volume,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Price => "price",
            MetricType::Volume => "volume",
        }
    }

    pub fn all() -> Vec<MetricType> {
        vec![MetricType::Price, MetricType::Volume]
    }
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
