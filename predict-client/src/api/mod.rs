//! Prediction service API

pub mod client;

pub use client::{
    BatchPredictionResponse, ClientConfig, ClientError, ErrorResponse, FeatureInput,
    HealthResponse, ModelStatus, PredictionClient, PredictionResponse, FEATURE_NAMES,
};
