use std::collections::HashMap;

use serde::Serialize;

use super::encoder::TrainingColumnSchema;
use super::estimator::Estimator;

/// Where feature importances come from, decided once when the model loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImportanceSource {
    /// Importances read from the top-level estimator.
    Plain,
    /// Importances read from a named member of a composite estimator.
    Composite { named_component: String },
}

impl ImportanceSource {
    pub fn select(estimator: &Estimator, preferred_component: &str) -> Self {
        match estimator.named_component(preferred_component) {
            Some(_) => ImportanceSource::Composite {
                named_component: preferred_component.to_string(),
            },
            None => ImportanceSource::Plain,
        }
    }

    pub fn extract<'a>(&self, estimator: &'a Estimator) -> Result<&'a [f64], UnsupportedModelError> {
        match self {
            ImportanceSource::Plain => {
                estimator
                    .feature_importances()
                    .ok_or_else(|| UnsupportedModelError {
                        reason: "classifier exposes no feature importances".to_string(),
                    })
            }
            ImportanceSource::Composite { named_component } => estimator
                .named_component(named_component)
                .and_then(Estimator::feature_importances)
                .ok_or_else(|| UnsupportedModelError {
                    reason: format!(
                        "component '{named_component}' exposes no feature importances"
                    ),
                }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("feature importances unavailable: {reason}")]
pub struct UnsupportedModelError {
    pub reason: String,
}

/// Importance weight per training column. Only the relative order matters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportanceTable {
    entries: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

impl ImportanceTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Pair weights with schema columns positionally; lengths are checked at load.
    pub fn from_columns(schema: &TrainingColumnSchema, weights: &[f64]) -> Self {
        Self::from_pairs(
            schema
                .columns()
                .iter()
                .cloned()
                .zip(weights.iter().copied()),
        )
    }

    /// Later duplicates are ignored so each column keeps a single weight.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, f64)>) -> Self {
        let mut table = Self::default();
        for (column, weight) in pairs {
            if table.index.contains_key(&column) {
                continue;
            }
            table.index.insert(column.clone(), table.entries.len());
            table.entries.push((column, weight));
        }
        table
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.index.get(column).map(|position| self.entries[*position].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Columns sorted by descending importance, ties in schema order.
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .entries
            .iter()
            .map(|(column, weight)| (column.as_str(), *weight))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::accreditation::prediction::estimator::{
        DecisionTree, ForestModel, LinearModel, NamedEstimator, TreeNode, VotingMode, VotingModel,
    };

    fn forest(importances: Option<Vec<f64>>) -> Estimator {
        Estimator::RandomForest(ForestModel {
            n_features: 2,
            n_classes: 2,
            trees: vec![DecisionTree {
                nodes: vec![TreeNode::Leaf {
                    value: vec![1.0, 1.0],
                }],
            }],
            feature_importances: importances,
        })
    }

    fn linear() -> Estimator {
        Estimator::LogisticRegression(LinearModel {
            coefficients: vec![vec![0.1, 0.2]],
            intercepts: vec![0.0],
        })
    }

    fn ensemble(name: &str) -> Estimator {
        Estimator::Voting(VotingModel {
            voting: VotingMode::Soft,
            estimators: vec![
                NamedEstimator {
                    name: name.to_string(),
                    model: forest(Some(vec![0.25, 0.75])),
                },
                NamedEstimator {
                    name: "lr".to_string(),
                    model: linear(),
                },
            ],
        })
    }

    #[test]
    fn composite_models_use_the_named_component() {
        let model = ensemble("rf");
        let source = ImportanceSource::select(&model, "rf");
        assert_eq!(
            source,
            ImportanceSource::Composite {
                named_component: "rf".to_string()
            }
        );
        assert_eq!(source.extract(&model).unwrap(), &[0.25, 0.75]);
    }

    #[test]
    fn falls_back_to_top_level_importances() {
        let model = forest(Some(vec![0.6, 0.4]));
        let source = ImportanceSource::select(&model, "rf");
        assert_eq!(source, ImportanceSource::Plain);
        assert_eq!(source.extract(&model).unwrap(), &[0.6, 0.4]);
    }

    #[test]
    fn composite_without_named_component_is_unsupported() {
        let model = ensemble("forest");
        let source = ImportanceSource::select(&model, "rf");
        assert_eq!(source, ImportanceSource::Plain);
        assert!(source.extract(&model).is_err());
        assert!(ImportanceSource::Plain.extract(&linear()).is_err());
    }

    #[test]
    fn ranked_is_descending_and_stable() {
        let table = ImportanceTable::from_pairs(vec![
            ("a".to_string(), 0.2),
            ("b".to_string(), 0.5),
            ("c".to_string(), 0.2),
            ("a".to_string(), 0.9),
        ]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("a"), Some(0.2));
        assert_eq!(table.ranked(), vec![("b", 0.5), ("a", 0.2), ("c", 0.2)]);
    }
}
