//! Exact path-dependent TreeSHAP
//!
//! Polynomial-time Shapley values for tree ensembles (Lundberg et al. 2018,
//! Algorithm 2). Features missing from a coalition follow both branches of a
//! split, weighted by the training cover of each child. Local accuracy holds:
//! `base_value + contributions.sum() == P(class 1 | x)`.

use ndarray::ArrayView1;
use serde::Serialize;

use super::forest::{goes_left, DecisionTree, Node};

/// Signed per-feature contributions towards the positive class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    /// Expected model output over the training distribution
    pub base_value: f64,
    pub contributions: Vec<f64>,
}

impl Explanation {
    /// Attribution magnitudes; the direction of each contribution is dropped
    pub fn magnitudes(&self) -> Vec<f64> {
        self.contributions.iter().map(|c| c.abs()).collect()
    }

    pub fn output(&self) -> f64 {
        self.base_value + self.contributions.iter().sum::<f64>()
    }
}

#[derive(Debug, Clone, Copy)]
struct PathElement {
    feature: Option<usize>,
    zero_fraction: f64,
    one_fraction: f64,
    weight: f64,
}

/// Averages per-tree Shapley values over the ensemble
pub(crate) fn forest_shap(trees: &[DecisionTree], row: ArrayView1<'_, f64>, n_features: usize) -> Explanation {
    let mut contributions = vec![0.0; n_features];
    let mut base_value = 0.0;

    for tree in trees {
        tree_shap(tree, row, &mut contributions);
        base_value += tree.expected_value();
    }

    let n_trees = trees.len().max(1) as f64;
    for c in contributions.iter_mut() {
        *c /= n_trees;
    }

    Explanation {
        base_value: base_value / n_trees,
        contributions,
    }
}

/// Adds the Shapley values of one tree for `row` into `phi`
pub(crate) fn tree_shap(tree: &DecisionTree, row: ArrayView1<'_, f64>, phi: &mut [f64]) {
    recurse(tree, 0, row, phi, Vec::new(), 1.0, 1.0, None);
}

#[allow(clippy::too_many_arguments)]
fn recurse(
    tree: &DecisionTree,
    id: usize,
    row: ArrayView1<'_, f64>,
    phi: &mut [f64],
    mut path: Vec<PathElement>,
    zero_fraction: f64,
    one_fraction: f64,
    feature: Option<usize>,
) {
    extend(&mut path, zero_fraction, one_fraction, feature);

    match *tree.node(id) {
        Node::Leaf { value, .. } => {
            for i in 1..path.len() {
                let weight = unwound_sum(&path, i);
                let element = path[i];
                if let Some(f) = element.feature {
                    phi[f] += weight * (element.one_fraction - element.zero_fraction) * value;
                }
            }
        }
        Node::Split {
            feature: split,
            threshold,
            left,
            right,
            cover,
        } => {
            let (hot, cold) = if goes_left(row[split], threshold) {
                (left, right)
            } else {
                (right, left)
            };
            let hot_zero_fraction = tree.node(hot).cover() / cover;
            let cold_zero_fraction = tree.node(cold).cover() / cover;

            // A feature seen higher up the path is folded back into a single element
            let mut incoming_zero = 1.0;
            let mut incoming_one = 1.0;
            if let Some(k) = path.iter().position(|e| e.feature == Some(split)) {
                incoming_zero = path[k].zero_fraction;
                incoming_one = path[k].one_fraction;
                unwind(&mut path, k);
            }

            recurse(
                tree,
                hot,
                row,
                phi,
                path.clone(),
                hot_zero_fraction * incoming_zero,
                incoming_one,
                Some(split),
            );
            recurse(
                tree,
                cold,
                row,
                phi,
                path,
                cold_zero_fraction * incoming_zero,
                0.0,
                Some(split),
            );
        }
    }
}

fn extend(path: &mut Vec<PathElement>, zero_fraction: f64, one_fraction: f64, feature: Option<usize>) {
    let depth = path.len();
    path.push(PathElement {
        feature,
        zero_fraction,
        one_fraction,
        weight: if depth == 0 { 1.0 } else { 0.0 },
    });

    let scale = (depth + 1) as f64;
    for i in (0..depth).rev() {
        path[i + 1].weight += one_fraction * path[i].weight * (i + 1) as f64 / scale;
        path[i].weight = zero_fraction * path[i].weight * (depth - i) as f64 / scale;
    }
}

fn unwind(path: &mut Vec<PathElement>, index: usize) {
    let depth = path.len() - 1;
    let one_fraction = path[index].one_fraction;
    let zero_fraction = path[index].zero_fraction;
    let scale = (depth + 1) as f64;
    let mut next_one_portion = path[depth].weight;

    for i in (0..depth).rev() {
        if one_fraction != 0.0 {
            let previous = path[i].weight;
            path[i].weight = next_one_portion * scale / ((i + 1) as f64 * one_fraction);
            next_one_portion = previous - path[i].weight * zero_fraction * (depth - i) as f64 / scale;
        } else {
            path[i].weight = path[i].weight * scale / (zero_fraction * (depth - i) as f64);
        }
    }

    for i in index..depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
    path.truncate(depth);
}

/// Total permutation weight of the path with element `index` removed
fn unwound_sum(path: &[PathElement], index: usize) -> f64 {
    let depth = path.len() - 1;
    let one_fraction = path[index].one_fraction;
    let zero_fraction = path[index].zero_fraction;
    let scale = (depth + 1) as f64;
    let mut next_one_portion = path[depth].weight;
    let mut total = 0.0;

    for i in (0..depth).rev() {
        if one_fraction != 0.0 {
            let tmp = next_one_portion * scale / ((i + 1) as f64 * one_fraction);
            total += tmp;
            next_one_portion = path[i].weight - tmp * zero_fraction * ((depth - i) as f64 / scale);
        } else if zero_fraction != 0.0 {
            total += (path[i].weight / zero_fraction) / ((depth - i) as f64 / scale);
        }
    }

    total
}
