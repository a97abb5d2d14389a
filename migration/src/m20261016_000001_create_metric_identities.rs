use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One row per tracked (ticker, metric_type) series
        manager
            .create_table(
                Table::create()
                    .table(MetricIdentities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MetricIdentities::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MetricIdentities::Ticker)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MetricIdentities::MetricType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MetricIdentities::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // get-or-create relies on this constraint for ON CONFLICT DO NOTHING
        manager
            .create_index(
                Index::create()
                    .name("idx_metric_identities_ticker_type")
                    .table(MetricIdentities::Table)
                    .col(MetricIdentities::Ticker)
                    .col(MetricIdentities::MetricType)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MetricIdentities::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum MetricIdentities {
    Table,
    Id,
    Ticker,
    MetricType,
    CreatedAt,
}
