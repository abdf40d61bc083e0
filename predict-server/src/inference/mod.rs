//! Inference Module - diabetes risk classifier
//!
//! This module handles:
//! - Feature layout shared by the JSON and CSV surfaces
//! - Loading the random forest artifact
//! - Single and batch prediction
//! - TreeSHAP feature attributions

pub mod batch;
pub mod explain;
pub mod features;
pub mod forest;
pub mod service;


use ndarray::{ArrayView1, ArrayView2};
use rayon::prelude::*;
use serde::Serialize;

pub use batch::BatchError;
pub use explain::Explanation;
pub use features::{Feature, FeatureVector, FEATURE_COUNT};
pub use forest::{ModelError, RandomForest};
pub use service::{ModelInfo, PredictionService};

/// A fitted binary classifier with per-prediction attributions
pub trait Classifier: Send + Sync {
    /// `[P(class 0), P(class 1)]` for one row
    fn predict_proba(&self, row: ArrayView1<'_, f64>) -> [f64; 2];

    /// Signed attributions towards class 1
    fn explain(&self, row: ArrayView1<'_, f64>) -> Explanation;

    /// Discrete class code; ties go to class 0
    fn predict(&self, row: ArrayView1<'_, f64>) -> usize {
        let [negative, positive] = self.predict_proba(row);
        if positive > negative {
            1
        } else {
            0
        }
    }

    /// Class codes for every row of `rows`
    fn predict_batch(&self, rows: ArrayView2<'_, f64>) -> Vec<usize> {
        (0..rows.nrows())
            .into_par_iter()
            .map(|i| self.predict(rows.row(i)))
            .collect()
    }
}

/// Human-readable outcome of the threshold rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Diagnosis {
    #[serde(rename = "Diabetic")]
    Diabetic,
    #[serde(rename = "Non-Diabetic")]
    NonDiabetic,
}

impl Diagnosis {
    /// Class code 1 is diabetic; any other code is not
    pub fn from_class_code(code: usize) -> Self {
        if code == 1 {
            Self::Diabetic
        } else {
            Self::NonDiabetic
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Diabetic => "Diabetic",
            Self::NonDiabetic => "Non-Diabetic",
        }
    }
}

impl std::fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one single-record prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub diagnosis: Diagnosis,
    /// Probability of the predicted class
    pub probability: f64,
    /// Absolute TreeSHAP value per feature, ordered as [`Feature::ALL`]
    pub attribution: Vec<f64>,
}
