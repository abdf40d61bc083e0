//! Diabetes Prediction Client
//!
//! Command-line front end for the prediction service: single predictions,
//! feature attribution charts, batch CSV annotation and user feedback.

pub mod api;
pub mod cli;
pub mod constants;
pub mod feedback;
pub mod render;

pub use api::{ClientConfig, ClientError, FeatureInput, PredictionClient};
pub use cli::{run, Cli};
