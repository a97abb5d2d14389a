//! Metric Poll Job
//!
//! Drives `poll_all` on the configured interval. The instant for a
//! cycle is captured once, before any provider call. A failed cycle is
//! logged and retried on the next tick. Stops on ctrl-c.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::config::MarketsConfig;
use crate::services::cryptowatch::MarketSummaryProvider;
use crate::services::metric_poller::poll_all;
use crate::services::metric_store::MetricStore;

/// Spawn the poll loop in the background
pub fn start_metric_poll_job(
    store: MetricStore,
    markets: Arc<MarketsConfig>,
    provider: Arc<dyn MarketSummaryProvider>,
    poll_interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        run_metric_poll_loop(store, markets, provider, poll_interval).await;
    })
}

/// Poll until a shutdown signal arrives
pub async fn run_metric_poll_loop(
    store: MetricStore,
    markets: Arc<MarketsConfig>,
    provider: Arc<dyn MarketSummaryProvider>,
    poll_interval: Duration,
) {
    info!(
        interval_secs = poll_interval.as_secs(),
        tickers = markets.ticker_count(),
        "Metric poll job started"
    );

    let mut ticker = interval(poll_interval);
    // A slow cycle must not trigger a burst of catch-up polls
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received, stopping metric poll job");
                break;
            }
            _ = ticker.tick() => {
                let now = Utc::now();
                if let Err(e) = poll_all(&markets, provider.as_ref(), &store, now).await {
                    error!(error = %e, timestamp = %now, "Poll cycle failed to persist");
                }
            }
        }
    }

    info!("Metric poll job stopped");
}

