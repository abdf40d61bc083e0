//! Random forest classifier loaded from a JSON artifact
//!
//! The artifact mirrors scikit-learn's `tree_` arrays: one entry per tree with
//! parallel `children_left` / `children_right` / `feature` / `threshold` /
//! `value` / `node_samples` vectors. Leaves have both children set to `-1`.
//! Samples go left when `x[feature] <= threshold`, with `x[feature]` first
//! rounded to `f32` the way scikit-learn stores its inputs, so values on a
//! single-precision boundary route the same way as in the trained model.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::explain::{self, Explanation};
use super::features::FEATURE_COUNT;
use super::Classifier;

const LEAF: i64 = -1;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid model artifact: {0}")]
    Invalid(String),
}

/// Serialized form of one tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeArrays {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-class weights reaching each node
    pub value: Vec<Vec<f64>>,
    /// Training cover of each node
    pub node_samples: Vec<f64>,
}

/// Serialized form of the whole ensemble
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestArtifact {
    #[serde(default = "default_model_type")]
    pub model_type: String,
    pub n_features: usize,
    pub classes: Vec<i64>,
    pub trees: Vec<TreeArrays>,
}

fn default_model_type() -> String {
    "random_forest".to_string()
}

/// Split rule: compare in single precision like the trained model did
pub(crate) fn goes_left(value: f64, threshold: f64) -> bool {
    (value as f32) as f64 <= threshold
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        cover: f64,
    },
    Leaf {
        /// Probability of class 1 at this leaf
        value: f64,
        cover: f64,
    },
}

impl Node {
    pub(crate) fn cover(&self) -> f64 {
        match *self {
            Node::Split { cover, .. } | Node::Leaf { cover, .. } => cover,
        }
    }
}

/// A single validated decision tree; node 0 is the root
#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn from_arrays(arrays: &TreeArrays, n_features: usize) -> Result<Self, String> {
        let n = arrays.children_left.len();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }

        let lengths = [
            arrays.children_right.len(),
            arrays.feature.len(),
            arrays.threshold.len(),
            arrays.value.len(),
            arrays.node_samples.len(),
        ];
        if lengths.iter().any(|&len| len != n) {
            return Err(format!(
                "node arrays disagree in length (expected {})",
                n
            ));
        }

        let mut nodes = Vec::with_capacity(n);
        for id in 0..n {
            let cover = arrays.node_samples[id];
            if !(cover > 0.0) {
                return Err(format!("node {} has non-positive cover", id));
            }

            let weights = &arrays.value[id];
            if weights.len() != 2 || weights.iter().any(|w| !(*w >= 0.0)) {
                return Err(format!(
                    "node {} must carry two non-negative class weights",
                    id
                ));
            }
            let total = weights[0] + weights[1];
            if !(total > 0.0) {
                return Err(format!("node {} has zero class weight", id));
            }

            let (left, right) = (arrays.children_left[id], arrays.children_right[id]);
            let node = match (left, right) {
                (LEAF, LEAF) => Node::Leaf {
                    value: weights[1] / total,
                    cover,
                },
                (l, r) if l > id as i64 && r > id as i64 && (l as usize) < n && (r as usize) < n => {
                    let feature = arrays.feature[id];
                    if feature < 0 || feature as usize >= n_features {
                        return Err(format!(
                            "node {} splits on unknown feature {}",
                            id, feature
                        ));
                    }
                    let threshold = arrays.threshold[id];
                    if !threshold.is_finite() {
                        return Err(format!("node {} has a non-finite threshold", id));
                    }
                    Node::Split {
                        feature: feature as usize,
                        threshold,
                        left: l as usize,
                        right: r as usize,
                        cover,
                    }
                }
                _ => {
                    return Err(format!(
                        "node {} has invalid children ({}, {})",
                        id, left, right
                    ))
                }
            };
            nodes.push(node);
        }

        Ok(Self { nodes })
    }

    pub(crate) fn node(&self, id: usize) -> &Node {
        &self.nodes[id]
    }

    /// Index of the leaf reached by `row`
    pub fn leaf_index(&self, row: ArrayView1<'_, f64>) -> usize {
        let mut id = 0;
        while let Node::Split { feature, threshold, left, right, .. } = self.nodes[id] {
            id = if goes_left(row[feature], threshold) { left } else { right };
        }
        id
    }

    /// Probability of class 1 for `row`
    pub fn predict_positive(&self, row: ArrayView1<'_, f64>) -> f64 {
        match self.nodes[self.leaf_index(row)] {
            Node::Leaf { value, .. } => value,
            Node::Split { .. } => unreachable!("leaf_index always stops at a leaf"),
        }
    }

    /// Cover-weighted mean leaf value, the TreeSHAP base value
    pub fn expected_value(&self) -> f64 {
        self.expected_from(0)
    }

    fn expected_from(&self, id: usize) -> f64 {
        match self.nodes[id] {
            Node::Leaf { value, .. } => value,
            Node::Split { left, right, cover, .. } => {
                let left_weight = self.nodes[left].cover() / cover;
                let right_weight = self.nodes[right].cover() / cover;
                left_weight * self.expected_from(left) + right_weight * self.expected_from(right)
            }
        }
    }

    pub fn depth(&self) -> usize {
        self.depth_from(0)
    }

    fn depth_from(&self, id: usize) -> usize {
        match self.nodes[id] {
            Node::Leaf { .. } => 0,
            Node::Split { left, right, .. } => 1 + self.depth_from(left).max(self.depth_from(right)),
        }
    }
}

/// Binary random forest; probability is the mean of the trees' leaf distributions
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForest {
    pub fn from_artifact(artifact: &ForestArtifact) -> Result<Self, ModelError> {
        if artifact.model_type != "random_forest" {
            return Err(ModelError::Invalid(format!(
                "unsupported model type '{}'",
                artifact.model_type
            )));
        }
        if artifact.n_features != FEATURE_COUNT {
            return Err(ModelError::Invalid(format!(
                "expected {} features, artifact declares {}",
                FEATURE_COUNT, artifact.n_features
            )));
        }
        if artifact.classes != [0, 1] {
            return Err(ModelError::Invalid(format!(
                "expected classes [0, 1], artifact declares {:?}",
                artifact.classes
            )));
        }
        if artifact.trees.is_empty() {
            return Err(ModelError::Invalid("forest has no trees".to_string()));
        }

        let trees = artifact
            .trees
            .iter()
            .enumerate()
            .map(|(i, arrays)| {
                DecisionTree::from_arrays(arrays, artifact.n_features)
                    .map_err(|reason| ModelError::Invalid(format!("tree {}: {}", i, reason)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            trees,
            n_features: artifact.n_features,
        })
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        let artifact: ForestArtifact = serde_json::from_slice(bytes)?;
        Self::from_artifact(&artifact)
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(DecisionTree::depth).max().unwrap_or(0)
    }
}

impl Classifier for RandomForest {
    fn predict_proba(&self, row: ArrayView1<'_, f64>) -> [f64; 2] {
        let positive = self
            .trees
            .iter()
            .map(|tree| tree.predict_positive(row))
            .sum::<f64>()
            / self.trees.len() as f64;
        [1.0 - positive, positive]
    }

    fn explain(&self, row: ArrayView1<'_, f64>) -> Explanation {
        explain::forest_shap(&self.trees, row, self.n_features)
    }
}
