//! Pre-trained estimators deserialized from the exported model artifact.
//!
//! Trees follow the usual export layout: split nodes send `x[feature] <= threshold`
//! to `left`, children always appear after their parent, and leaves carry per-class
//! weights (counts or fractions).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    RandomForest(ForestModel),
    LogisticRegression(LinearModel),
    Voting(VotingModel),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub n_features: usize,
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importances: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

/// Multinomial (or binary, with a single coefficient row) logistic regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingMode {
    #[default]
    Hard,
    Soft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VotingModel {
    #[serde(default)]
    pub voting: VotingMode,
    pub estimators: Vec<NamedEstimator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedEstimator {
    pub name: String,
    pub model: Estimator,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid {context}: {reason}")]
pub struct EstimatorError {
    pub context: String,
    pub reason: String,
}

impl EstimatorError {
    fn new(context: &str, reason: impl Into<String>) -> Self {
        Self {
            context: context.to_string(),
            reason: reason.into(),
        }
    }
}

impl Estimator {
    pub fn n_features(&self) -> usize {
        match self {
            Estimator::RandomForest(forest) => forest.n_features,
            Estimator::LogisticRegression(linear) => {
                linear.coefficients.first().map(Vec::len).unwrap_or(0)
            }
            Estimator::Voting(voting) => voting
                .estimators
                .first()
                .map(|member| member.model.n_features())
                .unwrap_or(0),
        }
    }

    pub fn n_classes(&self) -> usize {
        match self {
            Estimator::RandomForest(forest) => forest.n_classes,
            Estimator::LogisticRegression(linear) => match linear.coefficients.len() {
                1 => 2,
                rows => rows,
            },
            Estimator::Voting(voting) => voting
                .estimators
                .first()
                .map(|member| member.model.n_classes())
                .unwrap_or(0),
        }
    }

    /// Class index with the highest support; ties resolve to the lowest index.
    pub fn predict(&self, features: &[f64]) -> usize {
        argmax(&self.predict_proba(features))
    }

    /// Per-class support. Hard voting reports vote shares.
    pub fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        match self {
            Estimator::RandomForest(forest) => forest.predict_proba(features),
            Estimator::LogisticRegression(linear) => linear.predict_proba(features),
            Estimator::Voting(voting) => voting.predict_proba(features, self.n_classes()),
        }
    }

    /// Importances exposed directly by this estimator, if it has any.
    pub fn feature_importances(&self) -> Option<&[f64]> {
        match self {
            Estimator::RandomForest(forest) => forest.feature_importances.as_deref(),
            Estimator::LogisticRegression(_) | Estimator::Voting(_) => None,
        }
    }

    /// Named member of a voting ensemble.
    pub fn named_component(&self, name: &str) -> Option<&Estimator> {
        match self {
            Estimator::Voting(voting) => voting
                .estimators
                .iter()
                .find(|member| member.name == name)
                .map(|member| &member.model),
            Estimator::RandomForest(_) | Estimator::LogisticRegression(_) => None,
        }
    }

    /// Structural checks that make prediction infallible afterwards.
    pub fn validate(&self, context: &str) -> Result<(), EstimatorError> {
        match self {
            Estimator::RandomForest(forest) => forest.validate(context),
            Estimator::LogisticRegression(linear) => linear.validate(context),
            Estimator::Voting(voting) => voting.validate(context),
        }
    }
}

impl ForestModel {
    fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let mut totals = vec![0.0; self.n_classes];
        for tree in &self.trees {
            let leaf = normalize(tree.leaf(features));
            for (total, share) in totals.iter_mut().zip(leaf) {
                *total += share;
            }
        }
        let count = self.trees.len().max(1) as f64;
        totals.iter().map(|total| total / count).collect()
    }

    fn validate(&self, context: &str) -> Result<(), EstimatorError> {
        if self.n_features == 0 {
            return Err(EstimatorError::new(context, "forest declares zero features"));
        }
        if self.n_classes < 2 {
            return Err(EstimatorError::new(context, "forest needs at least two classes"));
        }
        if self.trees.is_empty() {
            return Err(EstimatorError::new(context, "forest has no trees"));
        }
        for (tree_index, tree) in self.trees.iter().enumerate() {
            tree.validate(context, tree_index, self.n_features, self.n_classes)?;
        }
        if let Some(importances) = &self.feature_importances {
            if importances.len() != self.n_features {
                return Err(EstimatorError::new(
                    context,
                    format!(
                        "{} feature importances for {} features",
                        importances.len(),
                        self.n_features
                    ),
                ));
            }
            if importances
                .iter()
                .any(|weight| !weight.is_finite() || *weight < 0.0)
            {
                return Err(EstimatorError::new(
                    context,
                    "feature importances must be finite and non-negative",
                ));
            }
        }
        Ok(())
    }
}

impl DecisionTree {
    fn leaf(&self, features: &[f64]) -> &[f64] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature).copied().unwrap_or(0.0);
                    index = if value <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { value } => return value,
            }
        }
    }

    fn validate(
        &self,
        context: &str,
        tree_index: usize,
        n_features: usize,
        n_classes: usize,
    ) -> Result<(), EstimatorError> {
        if self.nodes.is_empty() {
            return Err(EstimatorError::new(
                context,
                format!("tree {tree_index} has no nodes"),
            ));
        }
        let node_count = self.nodes.len();
        for (node_index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(EstimatorError::new(
                            context,
                            format!(
                                "tree {tree_index} node {node_index} splits on feature {feature} of {n_features}"
                            ),
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(EstimatorError::new(
                            context,
                            format!("tree {tree_index} node {node_index} has a non-finite threshold"),
                        ));
                    }
                    for child in [*left, *right] {
                        if child <= node_index || child >= node_count {
                            return Err(EstimatorError::new(
                                context,
                                format!(
                                    "tree {tree_index} node {node_index} points to invalid child {child}"
                                ),
                            ));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(EstimatorError::new(
                            context,
                            format!(
                                "tree {tree_index} leaf {node_index} has {} class weights, expected {n_classes}",
                                value.len()
                            ),
                        ));
                    }
                    if value.iter().any(|weight| !weight.is_finite() || *weight < 0.0) {
                        return Err(EstimatorError::new(
                            context,
                            format!("tree {tree_index} leaf {node_index} has invalid class weights"),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

impl LinearModel {
    fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let scores: Vec<f64> = self
            .coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(row, intercept)| {
                row.iter()
                    .zip(features)
                    .map(|(weight, value)| weight * value)
                    .sum::<f64>()
                    + intercept
            })
            .collect();

        if let [score] = scores.as_slice() {
            let positive = 1.0 / (1.0 + (-score).exp());
            return vec![1.0 - positive, positive];
        }

        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = scores.iter().map(|score| (score - max).exp()).collect();
        let total: f64 = exps.iter().sum();
        exps.iter().map(|value| value / total).collect()
    }

    fn validate(&self, context: &str) -> Result<(), EstimatorError> {
        let Some(first) = self.coefficients.first() else {
            return Err(EstimatorError::new(context, "no coefficient rows"));
        };
        if first.is_empty() {
            return Err(EstimatorError::new(context, "coefficient rows are empty"));
        }
        if self.coefficients.iter().any(|row| row.len() != first.len()) {
            return Err(EstimatorError::new(context, "coefficient rows differ in width"));
        }
        if self.intercepts.len() != self.coefficients.len() {
            return Err(EstimatorError::new(
                context,
                format!(
                    "{} intercepts for {} coefficient rows",
                    self.intercepts.len(),
                    self.coefficients.len()
                ),
            ));
        }
        let all_finite = self
            .coefficients
            .iter()
            .flatten()
            .chain(&self.intercepts)
            .all(|value| value.is_finite());
        if !all_finite {
            return Err(EstimatorError::new(context, "non-finite coefficients"));
        }
        Ok(())
    }
}

impl VotingModel {
    fn predict_proba(&self, features: &[f64], n_classes: usize) -> Vec<f64> {
        let mut totals = vec![0.0; n_classes];
        for member in &self.estimators {
            match self.voting {
                VotingMode::Hard => {
                    let class_index = member.model.predict(features);
                    if let Some(slot) = totals.get_mut(class_index) {
                        *slot += 1.0;
                    }
                }
                VotingMode::Soft => {
                    for (total, share) in totals.iter_mut().zip(member.model.predict_proba(features)) {
                        *total += share;
                    }
                }
            }
        }
        let count = self.estimators.len().max(1) as f64;
        totals.iter().map(|total| total / count).collect()
    }

    fn validate(&self, context: &str) -> Result<(), EstimatorError> {
        let Some(first) = self.estimators.first() else {
            return Err(EstimatorError::new(context, "voting ensemble has no estimators"));
        };
        let n_features = first.model.n_features();
        let n_classes = first.model.n_classes();
        let mut seen = std::collections::HashSet::new();
        for member in &self.estimators {
            let member_context = format!("{context}.{}", member.name);
            if !seen.insert(member.name.as_str()) {
                return Err(EstimatorError::new(
                    context,
                    format!("duplicate estimator name '{}'", member.name),
                ));
            }
            member.model.validate(&member_context)?;
            if member.model.n_features() != n_features || member.model.n_classes() != n_classes {
                return Err(EstimatorError::new(
                    &member_context,
                    format!(
                        "shape {}x{} disagrees with ensemble shape {n_features}x{n_classes}",
                        member.model.n_features(),
                        member.model.n_classes()
                    ),
                ));
            }
        }
        Ok(())
    }
}

fn normalize(weights: &[f64]) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    if total > 0.0 {
        weights.iter().map(|weight| weight / total).collect()
    } else {
        vec![1.0 / weights.len().max(1) as f64; weights.len()]
    }
}

fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (index, value) in values.iter().enumerate() {
        if *value > values[best] {
            best = index;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, low: [f64; 3], high: [f64; 3]) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf {
                    value: low.to_vec(),
                },
                TreeNode::Leaf {
                    value: high.to_vec(),
                },
            ],
        }
    }

    fn forest() -> Estimator {
        Estimator::RandomForest(ForestModel {
            n_features: 2,
            n_classes: 3,
            trees: vec![
                stump(0, 0.5, [8.0, 0.0, 2.0], [0.0, 9.0, 1.0]),
                stump(1, 0.25, [6.0, 0.0, 4.0], [0.0, 2.0, 8.0]),
            ],
            feature_importances: Some(vec![0.7, 0.3]),
        })
    }

    #[test]
    fn forest_averages_normalized_leaves() {
        let model = forest();
        model.validate("forest").expect("valid forest");

        let proba = model.predict_proba(&[1.0, 1.0]);
        assert!((proba[0] - 0.0).abs() < 1e-12);
        assert!((proba[1] - 0.55).abs() < 1e-12);
        assert!((proba[2] - 0.45).abs() < 1e-12);
        assert_eq!(model.predict(&[1.0, 1.0]), 1);
        assert_eq!(model.predict(&[0.0, 0.0]), 0);
    }

    #[test]
    fn binary_logistic_regression_uses_sigmoid() {
        let model = Estimator::LogisticRegression(LinearModel {
            coefficients: vec![vec![2.0, -1.0]],
            intercepts: vec![0.0],
        });
        assert_eq!(model.n_classes(), 2);
        assert_eq!(model.predict(&[1.0, 0.0]), 1);
        assert_eq!(model.predict(&[0.0, 1.0]), 0);
        let proba = model.predict_proba(&[0.0, 0.0]);
        assert!((proba[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn hard_voting_breaks_ties_towards_lowest_class() {
        let linear = Estimator::LogisticRegression(LinearModel {
            coefficients: vec![vec![0.0, 0.0], vec![0.0, 0.0], vec![0.0, 5.0]],
            intercepts: vec![0.0, 0.0, 0.0],
        });
        let ensemble = Estimator::Voting(VotingModel {
            voting: VotingMode::Hard,
            estimators: vec![
                NamedEstimator {
                    name: "rf".to_string(),
                    model: forest(),
                },
                NamedEstimator {
                    name: "lr".to_string(),
                    model: linear,
                },
            ],
        });
        ensemble.validate("ensemble").expect("valid ensemble");

        // forest votes 1, linear votes 2: tie resolves to class 1.
        assert_eq!(ensemble.predict(&[1.0, 1.0]), 1);
        assert!(ensemble.feature_importances().is_none());
        assert!(ensemble.named_component("rf").is_some());
        assert!(ensemble.named_component("gb").is_none());
    }

    #[test]
    fn validation_rejects_backward_child_references() {
        let model = Estimator::RandomForest(ForestModel {
            n_features: 1,
            n_classes: 2,
            trees: vec![DecisionTree {
                nodes: vec![
                    TreeNode::Leaf {
                        value: vec![1.0, 0.0],
                    },
                    TreeNode::Split {
                        feature: 0,
                        threshold: 0.5,
                        left: 0,
                        right: 0,
                    },
                ],
            }],
            feature_importances: None,
        });
        let err = model.validate("forest").expect_err("cycle rejected");
        assert!(err.reason.contains("invalid child"));
    }

    #[test]
    fn validation_rejects_mismatched_leaf_width() {
        let model = Estimator::RandomForest(ForestModel {
            n_features: 2,
            n_classes: 2,
            trees: vec![stump(0, 0.5, [1.0, 0.0, 0.0], [0.0, 1.0, 0.0])],
            feature_importances: None,
        });
        let err = model.validate("forest").expect_err("leaf width rejected");
        assert!(err.reason.contains("class weights"));
    }

    #[test]
    fn deserializes_tagged_artifact() {
        let raw = r#"{
            "kind": "voting",
            "estimators": [
                {"name": "rf", "model": {
                    "kind": "random_forest", "n_features": 1, "n_classes": 2,
                    "feature_importances": [1.0],
                    "trees": [{"nodes": [
                        {"type": "split", "feature": 0, "threshold": 0.5, "left": 1, "right": 2},
                        {"type": "leaf", "value": [3, 1]},
                        {"type": "leaf", "value": [0, 4]}
                    ]}]
                }}
            ]
        }"#;
        let model: Estimator = serde_json::from_str(raw).expect("artifact parses");
        model.validate("classifier").expect("artifact valid");
        assert_eq!(model.n_features(), 1);
        assert_eq!(model.predict(&[1.0]), 1);
        assert_eq!(model.predict(&[0.0]), 0);
    }
}
