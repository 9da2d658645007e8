//! Random forest estimator over flat decision-tree node arrays.
//!
//! Split nodes send a sample left when `x[feature] <= threshold`. Leaves
//! hold per-class weights; the forest probability is the mean of each tree's
//! normalised leaf distribution.

use super::ClassDistribution;
use crate::error::PredictionError;
use crate::schema::FeatureKey;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: [f64; 2],
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub trees: Vec<DecisionTree>,
}

impl DecisionTree {
    /// Children must point forward, so every walk terminates.
    fn validate(&self, tree: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err(format!("tree {tree} has no nodes"));
        }
        let len = self.nodes.len();
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= FeatureKey::COUNT {
                        return Err(format!(
                            "tree {tree} node {i} splits on feature {feature}, schema has {}",
                            FeatureKey::COUNT
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("tree {tree} node {i} has a non-finite threshold"));
                    }
                    for child in [*left, *right] {
                        if child <= i || child >= len {
                            return Err(format!(
                                "tree {tree} node {i} has invalid child index {child}"
                            ));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    let total = value[0] + value[1];
                    if value.iter().any(|v| !v.is_finite() || *v < 0.0)
                        || !total.is_finite()
                        || total <= 0.0
                    {
                        return Err(format!("tree {tree} leaf {i} has invalid class weights"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Normalised leaf distribution for `x`.
    fn leaf_distribution(&self, x: &[f64]) -> Result<[f64; 2], PredictionError> {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = x.get(*feature).ok_or(PredictionError::FeatureIndex {
                        index: *feature,
                        len: x.len(),
                    })?;
                    let next = if *value <= *threshold { *left } else { *right };
                    if next <= index {
                        return Err(PredictionError::InvalidDistribution {
                            reason: format!("tree walk loops back from node {index} to {next}"),
                        });
                    }
                    index = next;
                }
                Some(TreeNode::Leaf { value }) => {
                    let total = value[0] + value[1];
                    return Ok([value[0] / total, value[1] / total]);
                }
                None => {
                    return Err(PredictionError::InvalidDistribution {
                        reason: format!("tree walk reached missing node {index}"),
                    });
                }
            }
        }
    }
}

impl ForestModel {
    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".into());
        }
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(i, tree)| tree.validate(i))
    }

    pub fn probability(&self, x: &[f64]) -> Result<ClassDistribution, PredictionError> {
        if self.trees.is_empty() {
            return Err(PredictionError::InvalidDistribution {
                reason: "forest has no trees".into(),
            });
        }
        let mut sum = [0.0; 2];
        for tree in &self.trees {
            let [p0, p1] = tree.leaf_distribution(x)?;
            sum[0] += p0;
            sum[1] += p1;
        }
        let n = self.trees.len() as f64;
        let (p0, p1) = (sum[0] / n, sum[1] / n);
        if !p0.is_finite() || !p1.is_finite() {
            return Err(PredictionError::NonFinite {
                model: "random_forest".into(),
            });
        }
        ClassDistribution::new(p0, p1)
    }
}
