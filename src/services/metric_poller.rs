//! Metric Poller
//!
//! One poll cycle: fetch a market summary for every configured ticker, keep
//! what succeeded, and append it to the store in a single call stamped with
//! the cycle's start instant. A failing ticker is logged and skipped.

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use tracing::{error, info};

use crate::config::MarketsConfig;
use crate::entities::sea_orm_active_enums::MetricType;
use crate::error::MetricsError;
use crate::services::cryptowatch::{MarketSummary, MarketSummaryProvider};
use crate::services::metric_store::{MetricBatch, MetricStore};

/// Outcome of one poll cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollReport {
    pub attempted: usize,
    pub succeeded: usize,
    /// (ticker, error message) per failed fetch
    pub failed: Vec<(String, String)>,
    pub values_stored: usize,
}

/// `MARKET:PAIR`, uppercased
pub fn ticker_for(market: &str, pair: &str) -> String {
    format!("{}:{}", market, pair).to_uppercase()
}

/// Fetch every configured ticker and stage the successes.
///
/// Fetches run concurrently; the provider owns per-call timeouts.
pub async fn collect_batch(
    markets: &MarketsConfig,
    provider: &dyn MarketSummaryProvider,
) -> (MetricBatch, PollReport) {
    let targets: Vec<(String, &[MetricType])> = markets
        .markets
        .iter()
        .flat_map(|market| {
            market
                .pairs
                .iter()
                .map(move |pair| (ticker_for(&market.name, &pair.name), pair.metrics.as_slice()))
        })
        .collect();

    let results = join_all(
        targets
            .iter()
            .map(|(ticker, _)| provider.fetch_summary(ticker)),
    )
    .await;

    let mut batch = MetricBatch::new();
    let mut report = PollReport {
        attempted: targets.len(),
        ..Default::default()
    };

    for ((ticker, metrics), result) in targets.into_iter().zip(results) {
        match result {
            Ok(summary) => {
                report.succeeded += 1;
                let staged = metrics
                    .iter()
                    .map(|metric_type| (*metric_type, summary_value(&summary, *metric_type)))
                    .collect();
                batch.push((ticker, staged));
            }
            Err(e) => {
                error!(ticker = %ticker, error = %e, "Failed to pull market summary");
                report.failed.push((ticker, e.to_string()));
            }
        }
    }

    (batch, report)
}

fn summary_value(summary: &MarketSummary, metric_type: MetricType) -> f64 {
    match metric_type {
        MetricType::Price => summary.price,
        MetricType::Volume => summary.volume,
    }
}

/// Run one full poll cycle at instant `now`.
///
/// Provider failures never fail the cycle; a store failure does.
pub async fn poll_all(
    markets: &MarketsConfig,
    provider: &dyn MarketSummaryProvider,
    store: &MetricStore,
    now: DateTime<Utc>,
) -> Result<PollReport, MetricsError> {
    let (batch, mut report) = collect_batch(markets, provider).await;

    report.values_stored = store.append_values(&batch, now).await?;

    info!(
        attempted = report.attempted,
        succeeded = report.succeeded,
        failed = report.failed.len(),
        values_stored = report.values_stored,
        timestamp = %now,
        "Poll cycle complete"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MarketConfig, PairConfig};
    use crate::error::ProviderError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Canned responses per ticker; records every call
    struct FakeProvider {
        responses: HashMap<String, Option<MarketSummary>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeProvider {
        fn new(responses: &[(&str, Option<(f64, f64)>)]) -> Self {
            Self {
                responses: responses
                    .iter()
                    .map(|(ticker, r)| {
                        (
                            ticker.to_string(),
                            r.map(|(price, volume)| MarketSummary { price, volume }),
                        )
                    })
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MarketSummaryProvider for FakeProvider {
        async fn fetch_summary(&self, ticker: &str) -> Result<MarketSummary, ProviderError> {
            self.calls.lock().unwrap().push(ticker.to_string());
            match self.responses.get(ticker) {
                Some(Some(summary)) => Ok(*summary),
                _ => Err(ProviderError::Status {
                    ticker: ticker.to_string(),
                    status: 404,
                }),
            }
        }
    }

    fn kraken(pairs: Vec<PairConfig>) -> MarketsConfig {
        MarketsConfig {
            markets: vec![MarketConfig {
                name: "kraken".to_string(),
                pairs,
            }],
        }
    }

    fn pair(name: &str) -> PairConfig {
        PairConfig {
            name: name.to_string(),
            metrics: MetricType::all(),
        }
    }

    #[test]
    fn test_ticker_for_uppercases() {
        assert_eq!(ticker_for("kraken", "btcusd"), "KRAKEN:BTCUSD");
        assert_eq!(ticker_for("Coinbase-Pro", "EthUsd"), "COINBASE-PRO:ETHUSD");
    }

    #[tokio::test]
    async fn test_collect_batch_success() {
        let provider = FakeProvider::new(&[
            ("KRAKEN:BTCUSD", Some((1.1, 2.2))),
            ("KRAKEN:ETHUSD", Some((3.3, 4.4))),
        ]);
        let config = kraken(vec![pair("btcusd"), pair("ethusd")]);

        let (batch, report) = collect_batch(&config, &provider).await;

        assert_eq!(provider.calls.lock().unwrap().len(), 2);
        assert_eq!(report.attempted, 2);
        assert_eq!(report.succeeded, 2);
        assert!(report.failed.is_empty());

        let expected: MetricBatch = vec![
            (
                "KRAKEN:BTCUSD".to_string(),
                vec![(MetricType::Price, 1.1), (MetricType::Volume, 2.2)],
            ),
            (
                "KRAKEN:ETHUSD".to_string(),
                vec![(MetricType::Price, 3.3), (MetricType::Volume, 4.4)],
            ),
        ];
        assert_eq!(batch, expected);
    }

    #[tokio::test]
    async fn test_collect_batch_partial_failure() {
        let provider = FakeProvider::new(&[("KRAKEN:BTCUSD", Some((1.1, 2.2))), ("KRAKEN:ETHUSD", None)]);
        let config = kraken(vec![pair("btcusd"), pair("ethusd")]);

        let (batch, report) = collect_batch(&config, &provider).await;

        assert_eq!(report.attempted, 2);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "KRAKEN:ETHUSD");
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].0, "KRAKEN:BTCUSD");
    }

    #[tokio::test]
    async fn test_collect_batch_complete_failure() {
        let provider = FakeProvider::new(&[]);
        let config = kraken(vec![pair("btcusd"), pair("ethusd")]);

        let (batch, report) = collect_batch(&config, &provider).await;

        assert_eq!(provider.calls.lock().unwrap().len(), 2);
        assert_eq!(report.failed.len(), 2);
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn test_collect_batch_only_configured_metrics() {
        let provider = FakeProvider::new(&[("KRAKEN:BTCUSD", Some((10.0, 0.0)))]);
        let config = kraken(vec![PairConfig {
            name: "btcusd".to_string(),
            metrics: vec![MetricType::Volume],
        }]);

        let (batch, _) = collect_batch(&config, &provider).await;

        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].1, vec![(MetricType::Volume, 0.0)]);
    }

    #[tokio::test]
    async fn test_collect_batch_keeps_config_order() {
        let provider = FakeProvider::new(&[
            ("KRAKEN:BTCUSD", Some((1.0, 1.0))),
            ("ZONDA:USDTUSD", Some((2.0, 2.0))),
            ("BITFINEX:BTCUSD", Some((3.0, 3.0))),
        ]);
        let config = MarketsConfig {
            markets: vec![
                MarketConfig {
                    name: "kraken".to_string(),
                    pairs: vec![pair("btcusd")],
                },
                MarketConfig {
                    name: "zonda".to_string(),
                    pairs: vec![pair("usdtusd")],
                },
                MarketConfig {
                    name: "bitfinex".to_string(),
                    pairs: vec![pair("btcusd")],
                },
            ],
        };

        let (batch, _) = collect_batch(&config, &provider).await;

        let tickers: Vec<&str> = batch.iter().map(|(ticker, _)| ticker.as_str()).collect();
        assert_eq!(tickers, vec!["KRAKEN:BTCUSD", "ZONDA:USDTUSD", "BITFINEX:BTCUSD"]);
    }
}
