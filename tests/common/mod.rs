#![allow(dead_code)]

use axum::{body::Body, http::Request, Router};
use chrono::{DateTime, Utc};
use crypto_metrics::{
    entities::{metric_identities, metric_values, sea_orm_active_enums::MetricType},
    routes::build_router,
    services::metric_store::MetricStore,
    AppState,
};
use http_body_util::BodyExt;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, DbErr, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use tower::ServiceExt;

/// Fresh in-memory SQLite database with migrations applied.
/// A single pooled connection keeps every query on the same memory database.
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub async fn setup_test_store() -> MetricStore {
    MetricStore::new(setup_test_db().await.expect("Failed to set up test DB"))
}

pub fn build_test_router(store: MetricStore) -> Router {
    build_router(AppState { store })
}

pub async fn create_identity(
    store: &MetricStore,
    ticker: &str,
    metric_type: MetricType,
) -> metric_identities::Model {
    store
        .get_or_create_identity(ticker, metric_type)
        .await
        .expect("Failed to create identity")
}

/// Insert raw values for a metric, all at `timestamp`
pub async fn insert_values(
    store: &MetricStore,
    metric_id: i32,
    values: &[f64],
    timestamp: DateTime<Utc>,
) {
    for value in values {
        metric_values::ActiveModel {
            metric_id: Set(metric_id),
            value: Set(*value),
            timestamp: Set(timestamp),
            ..Default::default()
        }
        .insert(store.db())
        .await
        .expect("Failed to insert value");
    }
}

/// GET `uri` and return (status, JSON body)
pub async fn get_json(app: Router, uri: &str) -> (axum::http::StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

pub fn sample_std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
}
