use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};
use botica_api::build_router;
use botica_api::config::AppConfig;
use botica_api::state::{AppState, ExportTarget};
use botica_bedrock::provider::BedrockProvider;
use botica_bedrock::recommend::RecommendationClient;
use botica_storage::store::RecommendationStore;
use eyre::WrapErr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Structured JSON logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = AppConfig::from_env()?;

    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &config.aws_region {
        loader = loader.region(Region::new(region.clone()));
    }
    let sdk_config = loader.load().await;

    let store = RecommendationStore::open(&config.database_path)
        .wrap_err_with(|| format!("opening database {}", config.database_path.display()))?;

    let provider = Arc::new(BedrockProvider::new(&sdk_config));
    let recommender = Arc::new(RecommendationClient::new(provider, config.generation.clone()));

    let exports = config.export_bucket.clone().map(|bucket| ExportTarget {
        s3: aws_sdk_s3::Client::new(&sdk_config),
        bucket,
    });

    let state = AppState {
        store,
        recommender,
        exports,
    };

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .wrap_err_with(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(
        addr = %config.listen_addr,
        model_id = %config.generation.model_id,
        exports = config.export_bucket.is_some(),
        "botica api listening"
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
