//! Standalone poller: polls the configured markets on the configured
//! interval and persists the results, without serving the API.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crypto_metrics::{
    config::{AppConfig, MarketsConfig},
    db::connect_and_migrate,
    jobs::metric_poll_sync::run_metric_poll_loop,
    services::{cryptowatch::CryptowatchClient, metric_store::MetricStore},
};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,crypto_metrics=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "poll_metrics exited with error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = AppConfig::from_env()?;
    let markets = Arc::new(MarketsConfig::load(&config.markets_config_path)?);

    let db = connect_and_migrate(&config.database_url).await?;
    let provider = Arc::new(CryptowatchClient::new(
        config.cryptowatch_base_url.clone(),
        config.api_key.clone(),
        config.provider_timeout,
    )?);

    println!("Press Ctrl-C to exit.");
    run_metric_poll_loop(MetricStore::new(db), markets, provider, config.poll_interval).await;

    Ok(())
}
