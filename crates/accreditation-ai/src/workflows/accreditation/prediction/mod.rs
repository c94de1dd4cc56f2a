mod artifacts;
mod encoder;
mod estimator;
mod importance;

pub use artifacts::{ArtifactError, LabelDecoder};
pub use encoder::{FeatureVector, SchemaDefinitionError, SchemaMismatchError, TrainingColumnSchema};
pub use estimator::{
    DecisionTree, Estimator, EstimatorError, ForestModel, LinearModel, NamedEstimator, TreeNode,
    VotingMode, VotingModel,
};
pub use importance::{ImportanceSource, ImportanceTable, UnsupportedModelError};

use serde::Serialize;
use tracing::{info, warn};

use crate::config::ArtifactConfig;
use crate::workflows::accreditation::domain::AnswerSet;

/// Read-only model context: classifier, label decoder, and training schema.
///
/// Built once at startup and shared by every evaluation.
#[derive(Debug, Clone)]
pub struct AccreditationModel {
    classifier: Estimator,
    labels: LabelDecoder,
    schema: TrainingColumnSchema,
    importance: ImportanceSource,
}

impl AccreditationModel {
    /// Validate the artifacts against each other and pick the importance source.
    pub fn new(
        classifier: Estimator,
        labels: LabelDecoder,
        schema: TrainingColumnSchema,
        importance_component: &str,
    ) -> Result<Self, ArtifactError> {
        classifier.validate("classifier")?;

        if labels.is_empty() {
            return Err(ArtifactError::EmptyLabels);
        }
        if classifier.n_features() != schema.len() {
            return Err(SchemaMismatchError::VectorLength {
                expected: classifier.n_features(),
                actual: schema.len(),
            }
            .into());
        }
        if classifier.n_classes() != labels.len() {
            return Err(SchemaMismatchError::ClassCount {
                classifier: classifier.n_classes(),
                decoder: labels.len(),
            }
            .into());
        }

        let importance = ImportanceSource::select(&classifier, importance_component);
        Ok(Self {
            classifier,
            labels,
            schema,
            importance,
        })
    }

    /// Load and validate the three artifacts named in the configuration.
    pub fn load(config: &ArtifactConfig) -> Result<Self, ArtifactError> {
        let classifier = artifacts::read_classifier(&config.model_path)?;
        let labels = artifacts::read_labels(&config.labels_path)?;
        let schema = TrainingColumnSchema::new(artifacts::read_columns(&config.columns_path)?)?;

        let model = Self::new(classifier, labels, schema, &config.importance_component)?;
        info!(
            columns = model.schema.len(),
            classes = model.labels.len(),
            importance = ?model.importance,
            importances_available = model.importance_table().is_ok(),
            "accreditation model artifacts loaded"
        );
        Ok(model)
    }

    pub fn schema(&self) -> &TrainingColumnSchema {
        &self.schema
    }

    pub fn labels(&self) -> &LabelDecoder {
        &self.labels
    }

    pub fn importance_source(&self) -> &ImportanceSource {
        &self.importance
    }

    pub fn encode(&self, answers: &AnswerSet) -> FeatureVector {
        self.schema.encode(answers)
    }

    pub fn importance_table(&self) -> Result<ImportanceTable, UnsupportedModelError> {
        let weights = self.importance.extract(&self.classifier)?;
        Ok(ImportanceTable::from_columns(&self.schema, weights))
    }

    /// Predict the accreditation outcome. Missing importances degrade to an
    /// empty table rather than failing the prediction.
    pub fn predict(&self, vector: &FeatureVector) -> Result<Prediction, SchemaMismatchError> {
        let expected = self.classifier.n_features();
        if vector.len() != expected {
            return Err(SchemaMismatchError::VectorLength {
                expected,
                actual: vector.len(),
            });
        }

        let class_index = self.classifier.predict(vector.values());
        let label = self
            .labels
            .inverse_transform(class_index)
            .ok_or(SchemaMismatchError::UnknownClass {
                index: class_index,
                classes: self.labels.len(),
            })?
            .to_string();

        let importance = match self.importance_table() {
            Ok(table) => table,
            Err(err) => {
                warn!(%err, "weakness ranking disabled for this prediction");
                ImportanceTable::empty()
            }
        };

        Ok(Prediction {
            class_index,
            label,
            importance,
        })
    }
}

/// Classifier output plus the importance table used for weakness ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub class_index: usize,
    pub label: String,
    pub importance: ImportanceTable,
}

/// Summary of the loaded model for status endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub columns: usize,
    pub classes: Vec<String>,
    pub importance: ImportanceSource,
}

impl From<&AccreditationModel> for ModelSummary {
    fn from(model: &AccreditationModel) -> Self {
        Self {
            columns: model.schema.len(),
            classes: model.labels.classes().to_vec(),
            importance: model.importance.clone(),
        }
    }
}
