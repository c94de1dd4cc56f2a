use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::workflows::accreditation::catalog::DISCIPLINE_KEY;
use crate::workflows::accreditation::domain::AnswerSet;

/// Ordered column list the classifier was trained on, including one-hot
/// `discipline_<value>` columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingColumnSchema {
    columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaDefinitionError {
    #[error("training column schema is empty")]
    Empty,
    #[error("training column '{0}' appears more than once")]
    DuplicateColumn(String),
}

impl TrainingColumnSchema {
    pub fn new(columns: Vec<String>) -> Result<Self, SchemaDefinitionError> {
        if columns.is_empty() {
            return Err(SchemaDefinitionError::Empty);
        }
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(SchemaDefinitionError::DuplicateColumn(column.clone()));
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|candidate| candidate == column)
    }

    /// Align answers to schema order. Ratings fill their own column, the
    /// discipline sets its one-hot column, and everything else stays 0.
    pub fn encode(&self, answers: &AnswerSet) -> FeatureVector {
        let discipline_column = answers
            .discipline()
            .map(|discipline| format!("{DISCIPLINE_KEY}_{discipline}"));

        if let Some(column) = &discipline_column {
            if !self.contains(column) {
                debug!(%column, "discipline not present in training schema; encoding as neutral");
            }
        }

        let values = self
            .columns
            .iter()
            .map(|column| {
                if let Some(rating) = answers.rating(column) {
                    rating.value()
                } else if discipline_column.as_deref() == Some(column.as_str()) {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();

        FeatureVector { values }
    }
}

/// Numeric model input aligned to a [`TrainingColumnSchema`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Artifact drift between the schema, classifier, and label decoder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaMismatchError {
    #[error("feature vector has {actual} columns but the classifier expects {expected}")]
    VectorLength { expected: usize, actual: usize },
    #[error("classifier predicts {classifier} classes but the label decoder knows {decoder}")]
    ClassCount { classifier: usize, decoder: usize },
    #[error("classifier produced class index {index} outside the {classes} decoded labels")]
    UnknownClass { index: usize, classes: usize },
}
