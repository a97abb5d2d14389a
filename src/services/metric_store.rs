//! Metric Store
//!
//! Durable mapping from (ticker, metric type) to a metric identity, plus the
//! append-only value log for each identity. Transaction boundaries stay inside
//! this module; callers only see the operations below.

use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DbErr, EntityTrait, Order, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info};

use crate::entities::{
    metric_identities, metric_values,
    prelude::{MetricIdentities, MetricValues},
    sea_orm_active_enums::MetricType,
};
use crate::error::MetricsError;

/// (ticker, [(metric type, observed value)]) for one poll cycle.
///
/// Order matters: identities first seen in a batch are created in the order
/// they appear here, which fixes their ids.
pub type MetricBatch = Vec<(String, Vec<(MetricType, f64)>)>;

#[derive(Clone)]
pub struct MetricStore {
    db: DatabaseConnection,
}

impl MetricStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Return the identity for (ticker, metric_type), creating it on first use.
    /// Safe under concurrent callers racing on the same key.
    pub async fn get_or_create_identity(
        &self,
        ticker: &str,
        metric_type: MetricType,
    ) -> Result<metric_identities::Model, MetricsError> {
        Ok(get_or_create_identity_in(&self.db, ticker, metric_type).await?)
    }

    /// All identities in creation order
    pub async fn list_identities(&self) -> Result<Vec<metric_identities::Model>, MetricsError> {
        let identities = MetricIdentities::find()
            .order_by(metric_identities::Column::Id, Order::Asc)
            .all(&self.db)
            .await?;
        Ok(identities)
    }

    pub async fn get_identity_by_id(
        &self,
        id: i32,
    ) -> Result<Option<metric_identities::Model>, MetricsError> {
        Ok(MetricIdentities::find_by_id(id).one(&self.db).await?)
    }

    /// Persist one poll cycle. Every value gets the same `timestamp`, and the
    /// whole batch commits or rolls back as one transaction.
    ///
    /// Returns the number of values written. An empty batch touches nothing.
    pub async fn append_values(
        &self,
        batch: &MetricBatch,
        timestamp: DateTime<Utc>,
    ) -> Result<usize, MetricsError> {
        let value_count: usize = batch.iter().map(|(_, metrics)| metrics.len()).sum();
        if value_count == 0 {
            debug!("Empty metric batch, nothing to append");
            return Ok(0);
        }

        let txn = self.db.begin().await?;

        let mut rows = Vec::with_capacity(value_count);
        for (ticker, metrics) in batch {
            for (metric_type, value) in metrics {
                let identity = get_or_create_identity_in(&txn, ticker, *metric_type).await?;
                rows.push(metric_values::ActiveModel {
                    metric_id: Set(identity.id),
                    value: Set(*value),
                    timestamp: Set(timestamp),
                    ..Default::default()
                });
            }
        }

        MetricValues::insert_many(rows)
            .exec_without_returning(&txn)
            .await?;

        txn.commit().await?;

        info!(
            tickers = batch.len(),
            values = value_count,
            timestamp = %timestamp,
            "Appended metric batch"
        );

        Ok(value_count)
    }

    /// Values for `metric_id` with `timestamp >= since`, oldest first
    pub async fn get_history_since(
        &self,
        metric_id: i32,
        since: DateTime<Utc>,
    ) -> Result<Vec<metric_values::Model>, MetricsError> {
        let values = MetricValues::find()
            .filter(metric_values::Column::MetricId.eq(metric_id))
            .filter(metric_values::Column::Timestamp.gte(since))
            .order_by(metric_values::Column::Timestamp, Order::Asc)
            .order_by(metric_values::Column::Id, Order::Asc)
            .all(&self.db)
            .await?;
        Ok(values)
    }
}

/// Insert-if-absent then read back. `ON CONFLICT DO NOTHING` keeps a losing
/// racer from erroring (and from poisoning an enclosing Postgres transaction).
async fn get_or_create_identity_in<C>(
    conn: &C,
    ticker: &str,
    metric_type: MetricType,
) -> Result<metric_identities::Model, DbErr>
where
    C: ConnectionTrait,
{
    if let Some(existing) = find_identity(conn, ticker, metric_type).await? {
        return Ok(existing);
    }

    let new_identity = metric_identities::ActiveModel {
        ticker: Set(ticker.to_string()),
        metric_type: Set(metric_type),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let inserted = MetricIdentities::insert(new_identity)
        .on_conflict(
            OnConflict::columns([
                metric_identities::Column::Ticker,
                metric_identities::Column::MetricType,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    if inserted > 0 {
        info!(ticker = %ticker, metric_type = %metric_type, "Created metric identity");
    }

    find_identity(conn, ticker, metric_type)
        .await?
        .ok_or_else(|| {
            DbErr::RecordNotFound(format!(
                "metric identity {} / {} missing after insert",
                ticker, metric_type
            ))
        })
}

async fn find_identity<C>(
    conn: &C,
    ticker: &str,
    metric_type: MetricType,
) -> Result<Option<metric_identities::Model>, DbErr>
where
    C: ConnectionTrait,
{
    MetricIdentities::find()
        .filter(metric_identities::Column::Ticker.eq(ticker))
        .filter(metric_identities::Column::MetricType.eq(metric_type))
        .one(conn)
        .await
}
