use sea_orm_migration::prelude::*;

use crate::m20261016_000001_create_metric_identities::MetricIdentities;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Append-only observation log
        manager
            .create_table(
                Table::create()
                    .table(MetricValues::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MetricValues::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MetricValues::MetricId).integer().not_null())
                    .col(ColumnDef::new(MetricValues::Value).double().not_null())
                    .col(
                        ColumnDef::new(MetricValues::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_metric_values_metric_id")
                            .from(MetricValues::Table, MetricValues::MetricId)
                            .to(MetricIdentities::Table, MetricIdentities::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_metric_values_metric_id")
                    .table(MetricValues::Table)
                    .col(MetricValues::MetricId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_metric_values_timestamp")
                    .table(MetricValues::Table)
                    .col(MetricValues::Timestamp)
                    .to_owned(),
            )
            .await?;

        // Window scans: WHERE metric_id = ? AND timestamp >= ?
        manager
            .create_index(
                Index::create()
                    .name("idx_metric_values_metric_time")
                    .table(MetricValues::Table)
                    .col(MetricValues::MetricId)
                    .col((MetricValues::Timestamp, IndexOrder::Desc))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MetricValues::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MetricValues {
    Table,
    Id,
    MetricId,
    Value,
    Timestamp,
}
