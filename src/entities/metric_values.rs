//! SeaORM Entity for the append-only metric value log

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "metric_values")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning metric_identities.id
    pub metric_id: i32,
    #[sea_orm(column_type = "Double")]
    pub value: f64,
    /// Poll cycle instant; shared by every value written in that cycle
    pub timestamp: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::metric_identities::Entity",
        from = "Column::MetricId",
        to = "super::metric_identities::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    MetricIdentities,
}

impl Related<super::metric_identities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MetricIdentities.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
