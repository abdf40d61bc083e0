//! Diabetes prediction server binary

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use diabetes_predict_server::{
    config::{Config, LogFormat},
    AppState, PredictionService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    init_logging(&config);

    tracing::info!("Diabetes prediction server starting...");
    if config.is_production() {
        tracing::info!("Running in production mode");
    }

    // The model is loaded once and never mutated afterwards
    let service = PredictionService::load(&config.model_path)
        .with_context(|| format!("Failed to load model from {}", config.model_path.display()))?;

    let state = AppState::new(service, config.clone());

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server listening on http://{}", addr);

    diabetes_predict_server::serve(listener, state).await?;
    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "diabetes_predict_server=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
