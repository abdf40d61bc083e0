//! Prediction wire types

use serde::{Deserialize, Serialize};

use crate::inference::PredictionResult;

/// Body of a successful `POST /predictSingle`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// "Diabetic" or "Non-Diabetic"
    pub prediction: String,
    /// Probability of the predicted class
    pub pred_prob: f64,
    /// Attribution magnitude per feature, in model input order
    pub values_: Vec<f64>,
}

impl From<PredictionResult> for PredictionResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            prediction: result.diagnosis.label().to_string(),
            pred_prob: result.probability,
            values_: result.attribution,
        }
    }
}

/// Body of a successful `POST /predictBatch`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPredictionResponse {
    /// Uploaded table with an appended `prediction` column, as CSV text
    pub batch_pred: String,
}
