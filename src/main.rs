use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crypto_metrics::{
    config::{AppConfig, MarketsConfig},
    db::connect_and_migrate,
    jobs::metric_poll_sync::start_metric_poll_job,
    routes::build_router,
    services::{cryptowatch::CryptowatchClient, metric_store::MetricStore},
    AppState,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,crypto_metrics=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "crypto-metrics exited with error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = AppConfig::from_env()?;
    let db = connect_and_migrate(&config.database_url).await?;
    let store = MetricStore::new(db);

    if config.poll_enabled {
        let markets = Arc::new(MarketsConfig::load(&config.markets_config_path)?);
        let provider = Arc::new(CryptowatchClient::new(
            config.cryptowatch_base_url.clone(),
            config.api_key.clone(),
            config.provider_timeout,
        )?);
        start_metric_poll_job(store.clone(), markets, provider, config.poll_interval);
    } else {
        tracing::info!("POLL_ENABLED=false, serving API only");
    }

    let app = build_router(AppState { store });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
