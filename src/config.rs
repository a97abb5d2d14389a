//! Process configuration
//!
//! `AppConfig` comes from environment variables (a `.env` file is honoured via
//! `dotenvy`), `MarketsConfig` from the JSON file naming the markets and pairs
//! to poll. Both are built once at startup and passed down explicitly.

use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::entities::sea_orm_active_enums::MetricType;
use crate::error::ConfigError;

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_MARKETS_CONFIG_PATH: &str = "MARKETS_CONFIG_PATH";
pub const ENV_CRYPTO_API_KEY: &str = "CRYPTO_API_KEY";
pub const ENV_CRYPTOWATCH_BASE_URL: &str = "CRYPTOWATCH_BASE_URL";
pub const ENV_PROVIDER_TIMEOUT_SECS: &str = "PROVIDER_TIMEOUT_SECS";
pub const ENV_POLL_INTERVAL_SECS: &str = "POLL_INTERVAL_SECS";
pub const ENV_POLL_ENABLED: &str = "POLL_ENABLED";

const DEFAULT_DATABASE_URL: &str = "sqlite://metrics_db.sqlite?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MARKETS_CONFIG_PATH: &str = "config/market_pair_config.json";
const DEFAULT_CRYPTOWATCH_BASE_URL: &str = "https://api.cryptowat.ch";
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub markets_config_path: String,
    pub api_key: Option<String>,
    pub cryptowatch_base_url: String,
    pub provider_timeout: Duration,
    pub poll_interval: Duration,
    pub poll_enabled: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let provider_timeout_secs =
            parse_or(&get, ENV_PROVIDER_TIMEOUT_SECS, DEFAULT_PROVIDER_TIMEOUT_SECS)?;
        let poll_interval_secs = parse_or(&get, ENV_POLL_INTERVAL_SECS, DEFAULT_POLL_INTERVAL_SECS)?;
        let poll_enabled = parse_or(&get, ENV_POLL_ENABLED, true)?;

        if poll_interval_secs == 0 {
            return Err(ConfigError::InvalidEnv {
                name: ENV_POLL_INTERVAL_SECS,
                value: "0".to_string(),
            });
        }

        Ok(Self {
            database_url: get(ENV_DATABASE_URL).unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr: get(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            markets_config_path: get(ENV_MARKETS_CONFIG_PATH)
                .unwrap_or_else(|| DEFAULT_MARKETS_CONFIG_PATH.to_string()),
            api_key: get(ENV_CRYPTO_API_KEY),
            cryptowatch_base_url: get(ENV_CRYPTOWATCH_BASE_URL)
                .unwrap_or_else(|| DEFAULT_CRYPTOWATCH_BASE_URL.to_string()),
            provider_timeout: Duration::from_secs(provider_timeout_secs),
            poll_interval: Duration::from_secs(poll_interval_secs),
            poll_enabled,
        })
    }
}

fn parse_or<G, T>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match get(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .to_lowercase()
            .parse()
            .map_err(|_| ConfigError::InvalidEnv { name, value: raw }),
    }
}

/// Markets and pairs the poller tracks
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MarketsConfig {
    pub markets: Vec<MarketConfig>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MarketConfig {
    pub name: String,
    pub pairs: Vec<PairConfig>,
}

/// A tracked pair. Accepts either `"btcusd"` or
/// `{"name": "btcusd", "metrics": ["price"]}`; metrics default to all types.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(from = "PairEntry")]
pub struct PairConfig {
    pub name: String,
    pub metrics: Vec<MetricType>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PairEntry {
    Name(String),
    Detailed {
        name: String,
        #[serde(default = "MetricType::all")]
        metrics: Vec<MetricType>,
    },
}

impl From<PairEntry> for PairConfig {
    fn from(entry: PairEntry) -> Self {
        match entry {
            PairEntry::Name(name) => PairConfig {
                name,
                metrics: MetricType::all(),
            },
            PairEntry::Detailed { name, metrics } => PairConfig { name, metrics },
        }
    }
}

impl MarketsConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw, &path.display().to_string())
    }

    pub fn from_json(raw: &str, origin: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    pub fn ticker_count(&self) -> usize {
        self.markets.iter().map(|m| m.pairs.len()).sum()
    }
}
