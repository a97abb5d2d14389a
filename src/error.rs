use axum::http::StatusCode;
use sea_orm::DbErr;
use thiserror::Error;

/// Failures surfaced by the metric store, ranking engine and query API
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Invalid metric ID: \"{0}\". Must be an integer.")]
    InvalidInput(String),

    #[error("No such metric with ID {0}.")]
    NotFound(i64),

    #[error(
        "Not enough data to rank metric with ID {metric_id}: found {found} value(s) in the last 24 hours, need at least 2."
    )]
    InsufficientData { metric_id: i32, found: usize },

    #[error("Standard deviation for metric with ID {metric_id} is not a finite number.")]
    NonFiniteStatistic { metric_id: i32 },

    #[error("Database error: {0}")]
    Persistence(#[from] DbErr),
}

impl MetricsError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MetricsError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            MetricsError::NotFound(_) => StatusCode::NOT_FOUND,
            MetricsError::InsufficientData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            MetricsError::NonFiniteStatistic { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            MetricsError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client errors are expected traffic, not system faults
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Failure of a single market summary fetch
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Invalid ticker '{0}': expected MARKET:PAIR")]
    InvalidTicker(String),

    #[error("Request for {ticker} timed out")]
    Timeout { ticker: String },

    #[error("HTTP error for {ticker}: {source}")]
    Http {
        ticker: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Provider returned {status} for {ticker}")]
    Status { ticker: String, status: u16 },

    #[error("Could not decode summary for {ticker}: {source}")]
    Decode {
        ticker: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Startup configuration failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read markets config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse markets config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value for {name}: '{value}'")]
    InvalidEnv { name: &'static str, value: String },
}
