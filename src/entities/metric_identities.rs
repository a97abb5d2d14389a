//! `SeaORM` Entity for metric_identities table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::MetricType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "metric_identities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// `MARKET:PAIR`, e.g. `KRAKEN:BTCUSD`
    pub ticker: String,
    pub metric_type: MetricType,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::metric_values::Entity")]
    MetricValues,
}

impl Related<super::metric_values::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MetricValues.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
