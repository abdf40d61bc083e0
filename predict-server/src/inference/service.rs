//! Prediction service - the immutable request context
//!
//! Built once at startup and shared read-only by every handler.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ndarray::aview1;
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::batch::{self, BatchError};
use super::features::{FeatureVector, FEATURE_COUNT};
use super::forest::{ModelError, RandomForest};
use super::{Classifier, Diagnosis, PredictionResult};

/// Model status for the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub path: String,
    pub sha256: String,
    pub trees: usize,
    pub features: usize,
    pub max_depth: usize,
    pub loaded_at: DateTime<Utc>,
}

pub struct PredictionService {
    model: Arc<dyn Classifier>,
    info: ModelInfo,
}

impl std::fmt::Debug for PredictionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionService")
            .field("info", &self.info)
            .finish()
    }
}

impl PredictionService {
    /// Load the forest artifact from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        tracing::info!("Loading model artifact from: {}", path.display());

        let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(&bytes, path.display().to_string())
    }

    /// Parse an in-memory artifact; `origin` is reported by the health endpoint
    pub fn from_bytes(bytes: &[u8], origin: impl Into<String>) -> Result<Self, ModelError> {
        let forest = RandomForest::from_json_slice(bytes)?;
        let info = ModelInfo {
            path: origin.into(),
            sha256: hex::encode(Sha256::digest(bytes)),
            trees: forest.n_trees(),
            features: forest.n_features(),
            max_depth: forest.max_depth(),
            loaded_at: Utc::now(),
        };

        tracing::info!(
            trees = info.trees,
            max_depth = info.max_depth,
            sha256 = %info.sha256,
            "Model loaded successfully"
        );

        Ok(Self {
            model: Arc::new(forest),
            info,
        })
    }

    /// Wrap an arbitrary classifier
    pub fn with_classifier(model: Arc<dyn Classifier>, info: ModelInfo) -> Self {
        Self { model, info }
    }

    pub fn info(&self) -> &ModelInfo {
        &self.info
    }

    /// Label, predicted-class probability and attribution magnitudes for one record
    pub fn predict_single(&self, features: &FeatureVector) -> PredictionResult {
        let row: [f64; FEATURE_COUNT] = features.to_row();
        let row = aview1(&row);

        let proba = self.model.predict_proba(row);
        let code = self.model.predict(row);
        let explanation = self.model.explain(row);

        PredictionResult {
            diagnosis: Diagnosis::from_class_code(code),
            probability: proba[code],
            attribution: explanation.magnitudes(),
        }
    }

    /// Annotate an uploaded CSV with a `prediction` column
    pub fn predict_batch_csv(&self, content: &[u8]) -> Result<String, BatchError> {
        batch::annotate_csv(self.model.as_ref(), content)
    }
}
