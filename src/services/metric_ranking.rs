//! Metric Ranking Engine
//!
//! Ranks a metric against every metric of the same type by the sample
//! standard deviation of its values over the trailing 24 hours.
//!
//! Policy:
//! - the target needs at least 2 values in the window, otherwise
//!   `InsufficientData` (never a silent 0 or "1/1")
//! - peers with fewer than 2 values are left out of the population
//! - ascending by standard deviation, ties broken by ascending identity id
//! - a non-finite deviation (overflowed variance) sorts after every finite one

use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;
use futures_util::future::try_join_all;
use statrs::statistics::{Data, Distribution};
use tracing::{debug, info};

use crate::entities::{metric_identities, metric_values};
use crate::error::MetricsError;
use crate::services::metric_store::MetricStore;

/// Length of the ranking window
pub const RANKING_WINDOW_HOURS: i64 = 24;

/// Result of ranking one metric
#[derive(Debug, Clone)]
pub struct MetricRank {
    pub identity: metric_identities::Model,
    /// 1-based position, lowest standard deviation first
    pub rank: usize,
    /// Size of the ranked population
    pub total: usize,
    pub standard_deviation: f64,
    /// Window values, oldest first
    pub history: Vec<metric_values::Model>,
}

impl MetricRank {
    /// `"{rank}/{total}"`
    pub fn rank_label(&self) -> String {
        format!("{}/{}", self.rank, self.total)
    }
}

pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::hours(RANKING_WINDOW_HOURS)
}

/// Sample standard deviation (n - 1 denominator). `None` below 2 samples.
///
/// Values large enough to overflow the variance yield an infinite or NaN
/// result rather than `None`.
pub fn sample_standard_deviation(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    Data::new(values.to_vec()).std_dev()
}

/// Ordering of `(id, std_dev)` entries: std_dev ascending, then id ascending.
/// NaN is treated as +inf so every non-finite entry lands at the end.
pub fn compare_ranked(a: &(i32, f64), b: &(i32, f64)) -> Ordering {
    rank_key(a.1).total_cmp(&rank_key(b.1)).then(a.0.cmp(&b.0))
}

fn rank_key(std_dev: f64) -> f64 {
    if std_dev.is_nan() {
        f64::INFINITY
    } else {
        std_dev
    }
}

/// 1-based position of `target` within `peers` plus itself
pub fn rank_among(target: (i32, f64), peers: &[(i32, f64)]) -> usize {
    1 + peers
        .iter()
        .filter(|peer| compare_ranked(peer, &target) == Ordering::Less)
        .count()
}

/// Rank `metric_id` among metrics of its type as of `now`
pub async fn rank_metric(
    store: &MetricStore,
    metric_id: i32,
    now: DateTime<Utc>,
) -> Result<MetricRank, MetricsError> {
    let target = store
        .get_identity_by_id(metric_id)
        .await?
        .ok_or(MetricsError::NotFound(metric_id as i64))?;

    let since = window_start(now);
    let history = store.get_history_since(target.id, since).await?;
    let target_values: Vec<f64> = history.iter().map(|v| v.value).collect();

    let standard_deviation = sample_standard_deviation(&target_values).ok_or(
        MetricsError::InsufficientData {
            metric_id: target.id,
            found: target_values.len(),
        },
    )?;
    if !standard_deviation.is_finite() {
        return Err(MetricsError::NonFiniteStatistic {
            metric_id: target.id,
        });
    }

    let peers: Vec<metric_identities::Model> = store
        .list_identities()
        .await?
        .into_iter()
        .filter(|identity| identity.metric_type == target.metric_type && identity.id != target.id)
        .collect();

    // One independent window read per peer
    let peer_std_devs = try_join_all(peers.iter().map(|peer| async move {
        let peer_history = store.get_history_since(peer.id, since).await?;
        let values: Vec<f64> = peer_history.iter().map(|v| v.value).collect();
        Ok::<_, MetricsError>((peer.id, sample_standard_deviation(&values)))
    }))
    .await?;

    let mut ranked_peers: Vec<(i32, f64)> = Vec::with_capacity(peer_std_devs.len());
    for (peer_id, std_dev) in peer_std_devs {
        match std_dev {
            Some(std_dev) => ranked_peers.push((peer_id, std_dev)),
            None => debug!(peer_id, "Peer has fewer than 2 values in window, excluded"),
        }
    }

    let total = ranked_peers.len() + 1;
    let rank = rank_among((target.id, standard_deviation), &ranked_peers);

    info!(
        metric_id = target.id,
        ticker = %target.ticker,
        metric_type = %target.metric_type,
        rank,
        total,
        standard_deviation,
        "Ranked metric"
    );

    Ok(MetricRank {
        identity: target,
        rank,
        total,
        standard_deviation,
        history,
    })
}
