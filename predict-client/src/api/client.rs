//! Prediction API Client
//!
//! HTTP client for the diabetes prediction service. One request per action,
//! no retries.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Feature names as the service expects them, in model input order
pub const FEATURE_NAMES: [&str; 8] = [
    "Pregnancies",
    "Glucose",
    "Blood_Pressure",
    "Skin_Thickness",
    "Insulin",
    "BMI",
    "Diabetes_Pedigree_Function",
    "Age",
];

/// Prediction service configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: crate::constants::get_api_url(),
        }
    }
}

/// Prediction API client
pub struct PredictionClient {
    config: ClientConfig,
    http_client: reqwest::Client,
}

// Request/Response types

/// One patient record
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FeatureInput {
    #[serde(rename = "Pregnancies")]
    pub pregnancies: f64,
    #[serde(rename = "Glucose")]
    pub glucose: f64,
    #[serde(rename = "Blood_Pressure")]
    pub blood_pressure: f64,
    #[serde(rename = "Skin_Thickness")]
    pub skin_thickness: f64,
    #[serde(rename = "Insulin")]
    pub insulin: f64,
    #[serde(rename = "BMI")]
    pub bmi: f64,
    #[serde(rename = "Diabetes_Pedigree_Function")]
    pub diabetes_pedigree_function: f64,
    #[serde(rename = "Age")]
    pub age: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionResponse {
    pub prediction: String,
    pub pred_prob: f64,
    pub values_: Vec<f64>,
}

impl PredictionResponse {
    /// Attribution values paired with their feature names
    pub fn attributions(&self) -> Vec<(&'static str, f64)> {
        FEATURE_NAMES
            .iter()
            .copied()
            .zip(self.values_.iter().copied())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchPredictionResponse {
    pub batch_pred: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelStatus {
    pub path: String,
    pub sha256: String,
    pub trees: usize,
    pub features: usize,
    pub max_depth: usize,
    pub loaded_at: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: i64,
    pub model: ModelStatus,
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}

impl PredictionClient {
    /// Create new prediction client
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.config.server_url
    }

    /// Check service health
    pub async fn health_check(&self) -> Result<HealthResponse, ClientError> {
        let url = format!("{}/health", self.config.server_url);

        let response = self.http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Self::parse_response(response).await
    }

    /// Predict one record and fetch its attributions
    pub async fn predict_single(&self, input: &FeatureInput) -> Result<PredictionResponse, ClientError> {
        let url = format!("{}/predictSingle", self.config.server_url);

        log::debug!("POST {} {:?}", url, input);

        let response = self.http_client
            .post(&url)
            .json(input)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Self::parse_response(response).await
    }

    /// Upload a CSV file and get it back with a `prediction` column
    pub async fn predict_batch(
        &self,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<BatchPredictionResponse, ClientError> {
        let url = format!("{}/predictBatch", self.config.server_url);

        log::debug!("POST {} ({} bytes from {})", url, content.len(), file_name);

        let part = reqwest::multipart::Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str("text/csv")
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self.http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Self::parse_response(response).await
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return response.json().await
                .map_err(|e| ClientError::Parse(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);

        log::warn!("Service returned {}: {}", status.as_u16(), detail);

        Err(ClientError::Server {
            status: status.as_u16(),
            detail,
        })
    }
}

/// Prediction API errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error {status}: {detail}")]
    Server { status: u16, detail: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl ClientError {
    /// HTTP status for server-side failures
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_input_uses_service_keys() {
        let input = FeatureInput {
            pregnancies: 2.0,
            glucose: 120.0,
            blood_pressure: 70.0,
            skin_thickness: 20.0,
            insulin: 80.0,
            bmi: 25.0,
            diabetes_pedigree_function: 0.5,
            age: 30.0,
        };

        let value = serde_json::to_value(input).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 8);
        for name in FEATURE_NAMES {
            assert!(object.contains_key(name), "missing key {}", name);
        }
        assert_eq!(value["Blood_Pressure"], 70.0);
    }

    #[test]
    fn test_attributions_follow_feature_order() {
        let response = PredictionResponse {
            prediction: "Diabetic".to_string(),
            pred_prob: 0.77,
            values_: vec![0.1, 0.2, 0.0, 0.0, 0.3, 0.4, 0.05, 0.06],
        };

        let pairs = response.attributions();
        assert_eq!(pairs.len(), 8);
        assert_eq!(pairs[1], ("Glucose", 0.2));
        assert_eq!(pairs[7], ("Age", 0.06));
    }

    #[test]
    fn test_error_status() {
        let err = ClientError::Server { status: 400, detail: "bad".to_string() };
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.to_string(), "Server error 400: bad");
        assert_eq!(ClientError::Network("refused".to_string()).status(), None);
    }
}
