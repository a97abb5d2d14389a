use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::{error, info, warn};

use crate::error::MetricsError;
use crate::models::metric::{
    ErrorResponse, MetricDetailResponse, MetricSummary, MetricsListResponse,
};
use crate::services::metric_ranking::rank_metric;
use crate::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: MetricsError) -> ApiError {
    if err.is_client_error() {
        warn!(error = %err, "Rejected metrics request");
    } else {
        error!(error = %err, "Metrics request failed");
    }
    (
        err.status_code(),
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// Parse a path segment into a metric id. Integers outside the id range
/// cannot name a metric, so they are reported as not found.
pub fn parse_metric_id(raw: &str) -> Result<i32, MetricsError> {
    let id: i64 = raw
        .parse()
        .map_err(|_| MetricsError::InvalidInput(raw.to_string()))?;
    i32::try_from(id).map_err(|_| MetricsError::NotFound(id))
}

/// GET /metrics
///
/// Every tracked metric in creation order.
pub async fn list_metrics(
    State(state): State<AppState>,
) -> Result<Json<MetricsListResponse>, ApiError> {
    let identities = state.store.list_identities().await.map_err(api_error)?;

    Ok(Json(MetricsListResponse {
        metrics: identities.into_iter().map(MetricSummary::from).collect(),
    }))
}

/// GET /metrics/{id}
///
/// 24h history, 24h standard deviation and rank among metrics of the same type.
///
/// # Response
/// - 200: metric detail
/// - 400: id is not an integer
/// - 404: no such metric
/// - 422: fewer than 2 values in the last 24h
/// - 500: database error
pub async fn get_metric(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<MetricDetailResponse>, ApiError> {
    let metric_id = parse_metric_id(&raw_id).map_err(api_error)?;

    let ranked = rank_metric(&state.store, metric_id, Utc::now())
        .await
        .map_err(api_error)?;

    info!(
        metric_id,
        rank = %ranked.rank_label(),
        points = ranked.history.len(),
        "Metric detail served"
    );

    Ok(Json(ranked.into()))
}
