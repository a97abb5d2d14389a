//! Market summary provider backed by the Cryptowatch REST API
//!
//! `GET {base}/markets/{market}/{pair}/summary` returns the last price and the
//! 24h volume for one ticker. Timeouts are enforced per request by the client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::ProviderError;

const API_KEY_HEADER: &str = "X-CW-API-Key";

/// Price and volume for a ticker at the time of the call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketSummary {
    pub price: f64,
    pub volume: f64,
}

/// Source of market summaries, one ticker per call
#[async_trait]
pub trait MarketSummaryProvider: Send + Sync {
    async fn fetch_summary(&self, ticker: &str) -> Result<MarketSummary, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    result: SummaryResult,
}

#[derive(Debug, Deserialize)]
struct SummaryResult {
    price: SummaryPrice,
    volume: f64,
}

#[derive(Debug, Deserialize)]
struct SummaryPrice {
    last: f64,
}

#[derive(Clone)]
pub struct CryptowatchClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CryptowatchClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Summary endpoint for a `MARKET:PAIR` ticker
    pub fn summary_url(&self, ticker: &str) -> Result<String, ProviderError> {
        let (market, pair) = split_ticker(ticker)?;
        Ok(format!(
            "{}/markets/{}/{}/summary",
            self.base_url,
            market.to_lowercase(),
            pair.to_lowercase()
        ))
    }
}

fn split_ticker(ticker: &str) -> Result<(&str, &str), ProviderError> {
    match ticker.split_once(':') {
        Some((market, pair)) if !market.is_empty() && !pair.is_empty() && !pair.contains(':') => {
            Ok((market, pair))
        }
        _ => Err(ProviderError::InvalidTicker(ticker.to_string())),
    }
}

/// Decode a summary response body
pub fn parse_summary(ticker: &str, body: &str) -> Result<MarketSummary, ProviderError> {
    let response: SummaryResponse =
        serde_json::from_str(body).map_err(|source| ProviderError::Decode {
            ticker: ticker.to_string(),
            source,
        })?;

    Ok(MarketSummary {
        price: response.result.price.last,
        volume: response.result.volume,
    })
}

#[async_trait]
impl MarketSummaryProvider for CryptowatchClient {
    async fn fetch_summary(&self, ticker: &str) -> Result<MarketSummary, ProviderError> {
        let url = self.summary_url(ticker)?;
        debug!(ticker = %ticker, url = %url, "Pulling market summary");

        let mut request = self.client.get(&url).header("accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let http_error = |source: reqwest::Error| {
            if source.is_timeout() {
                ProviderError::Timeout {
                    ticker: ticker.to_string(),
                }
            } else {
                ProviderError::Http {
                    ticker: ticker.to_string(),
                    source,
                }
            }
        };

        let response = request.send().await.map_err(http_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                ticker: ticker.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(http_error)?;
        let summary = parse_summary(ticker, &body)?;

        debug!(
            ticker = %ticker,
            price = summary.price,
            volume = summary.volume,
            "Market summary received"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> CryptowatchClient {
        CryptowatchClient::new("https://api.cryptowat.ch/", None, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_summary_url_lowercases_ticker() {
        assert_eq!(
            client().summary_url("KRAKEN:BTCUSD").unwrap(),
            "https://api.cryptowat.ch/markets/kraken/btcusd/summary"
        );
    }

    #[test]
    fn test_invalid_tickers_rejected() {
        for ticker in ["BTCUSD", ":BTCUSD", "KRAKEN:", "A:B:C"] {
            assert!(
                matches!(client().summary_url(ticker), Err(ProviderError::InvalidTicker(_))),
                "{ticker} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_summary() {
        let body = r#"{
            "result": {
                "price": {"last": 123.45, "high": 130.0, "low": 120.0,
                          "change": {"percentage": 0.01, "absolute": 1.2}},
                "volume": 67.89,
                "volumeQuote": 8300.2
            },
            "allowance": {"cost": 0.005, "remaining": 9.9}
        }"#;
        let summary = parse_summary("KRAKEN:DOGEUSD", body).unwrap();
        assert_eq!(summary, MarketSummary { price: 123.45, volume: 67.89 });
    }

    #[test]
    fn test_parse_summary_zero_is_a_value() {
        let body = r#"{"result": {"price": {"last": 0}, "volume": 0}}"#;
        let summary = parse_summary("KRAKEN:DOGEUSD", body).unwrap();
        assert_eq!(summary, MarketSummary { price: 0.0, volume: 0.0 });
    }

    #[test]
    fn test_parse_summary_bad_body() {
        let err = parse_summary("KRAKEN:DOGEUSD", r#"{"error": "Instrument not found"}"#)
            .unwrap_err();
        assert!(matches!(err, ProviderError::Decode { .. }));
        assert!(err.to_string().contains("KRAKEN:DOGEUSD"));
    }
}
