//! Diabetes Prediction Service
//!
//! Serves one pre-trained random forest over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  DIABETES PREDICTION SERVICE                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────┐  │
//! │  │ /predictSingle│   │ /predictBatch │   │   /health     │  │
//! │  └───────┬───────┘   └───────┬───────┘   └───────┬───────┘  │
//! │          │        ┌──────────┴────────┐          │          │
//! │          │        │ CSV (polars)      │          │          │
//! │          │        └──────────┬────────┘          │          │
//! │          └───────────────────┼───────────────────┘          │
//! │                              ▼                              │
//! │        ┌─────────────────────────────────────────┐          │
//! │        │ PredictionService (read-only, shared)   │          │
//! │        │   RandomForest + TreeSHAP               │          │
//! │        └─────────────────────────────────────────┘          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod inference;
pub mod models;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};

pub use config::Config;
pub use error::{AppError, AppResult};
pub use inference::PredictionService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService>,
    pub config: Config,
}

impl AppState {
    pub fn new(service: PredictionService, config: Config) -> Self {
        Self {
            service: Arc::new(service),
            config,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/predictSingle", post(handlers::predict::single))
        .route("/predictBatch", post(handlers::predict::batch))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

/// Serve the router on an already-bound listener until the process exits
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, create_router(state)).await
}
