use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::body::to_bytes;
use axum::response::Response;
use serde_json::Value;

use crate::workflows::accreditation::advisory::{
    AdvisoryGenerationError, AdvisoryGenerator, AdvisoryRequest, AdvisoryResponse,
};
use crate::workflows::accreditation::catalog::{
    Discipline, Section, DISCIPLINE_KEY, QUESTIONNAIRE, STAFF_RATIO_KEY,
};
use crate::workflows::accreditation::domain::{EnrolmentFigures, Rating, SelfStudySubmission};
use crate::workflows::accreditation::prediction::{
    AccreditationModel, DecisionTree, Estimator, ForestModel, LabelDecoder, LinearModel,
    NamedEstimator, TrainingColumnSchema, TreeNode, VotingMode, VotingModel,
};
use crate::workflows::accreditation::service::{AccreditationService, AssessmentSettings};

pub(super) const CURRICULUM: &str = "curriculum_aligned_with_BMAS";
pub(super) const CORE_STAFF: &str = "proportion_core_staff_sufficient";

pub(super) fn labels() -> Vec<String> {
    ["Denied", "Full Accreditation", "Interim Accreditation"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Every catalog item, the staff ratio column, and one column per discipline.
pub(super) fn training_columns() -> Vec<String> {
    let mut columns: Vec<String> = QUESTIONNAIRE
        .iter()
        .map(|item| item.key.to_string())
        .collect();
    columns.push(STAFF_RATIO_KEY.to_string());
    columns.extend(
        Discipline::ALL
            .into_iter()
            .map(|discipline| format!("{DISCIPLINE_KEY}_{}", discipline.name())),
    );
    columns
}

pub(super) fn column_index(columns: &[String], key: &str) -> usize {
    columns
        .iter()
        .position(|column| column == key)
        .expect("column present")
}

/// Curriculum weighs 0.5, core staff 0.3, staff ratio 0.1, everything else 0.01.
pub(super) fn importances(columns: &[String]) -> Vec<f64> {
    columns
        .iter()
        .map(|column| match column.as_str() {
            CURRICULUM => 0.5,
            CORE_STAFF => 0.3,
            STAFF_RATIO_KEY => 0.1,
            _ => 0.01,
        })
        .collect()
}

/// Non-compliant staff ratio → Denied; otherwise curriculum alignment decides
/// between Full and Interim accreditation.
pub(super) fn forest(columns: &[String]) -> Estimator {
    let ratio = column_index(columns, STAFF_RATIO_KEY);
    let curriculum = column_index(columns, CURRICULUM);
    Estimator::RandomForest(ForestModel {
        n_features: columns.len(),
        n_classes: 3,
        trees: vec![DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: ratio,
                    threshold: 0.25,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf {
                    value: vec![5.0, 0.0, 0.0],
                },
                TreeNode::Split {
                    feature: curriculum,
                    threshold: 0.75,
                    left: 3,
                    right: 4,
                },
                TreeNode::Leaf {
                    value: vec![0.0, 0.0, 5.0],
                },
                TreeNode::Leaf {
                    value: vec![0.0, 5.0, 0.0],
                },
            ],
        }],
        feature_importances: Some(importances(columns)),
    })
}

/// Soft-voting ensemble whose linear member is uniform, so the forest decides.
pub(super) fn ensemble(columns: &[String]) -> Estimator {
    Estimator::Voting(VotingModel {
        voting: VotingMode::Soft,
        estimators: vec![
            NamedEstimator {
                name: "rf".to_string(),
                model: forest(columns),
            },
            NamedEstimator {
                name: "lr".to_string(),
                model: Estimator::LogisticRegression(LinearModel {
                    coefficients: vec![vec![0.0; columns.len()]; 3],
                    intercepts: vec![0.0; 3],
                }),
            },
        ],
    })
}

pub(super) fn model() -> AccreditationModel {
    let columns = training_columns();
    AccreditationModel::new(
        ensemble(&columns),
        LabelDecoder::new(labels()),
        TrainingColumnSchema::new(columns).expect("valid schema"),
        "rf",
    )
    .expect("consistent artifacts")
}

/// Academic fully implemented, every other section partially implemented.
pub(super) fn submission() -> SelfStudySubmission {
    let answers: BTreeMap<String, Rating> = QUESTIONNAIRE
        .iter()
        .map(|item| {
            let rating = if item.section == Section::Academic {
                Rating::FullyImplemented
            } else {
                Rating::PartiallyImplemented
            };
            (item.code.to_string(), rating)
        })
        .collect();

    SelfStudySubmission {
        institution: "University of Lagos".to_string(),
        programme: "Computer Science".to_string(),
        discipline: Discipline::Computing,
        enrolment: EnrolmentFigures {
            students: 20,
            core_staff: 1,
        },
        answers,
    }
}

pub(super) fn build_service<G>(generator: G) -> AccreditationService<G>
where
    G: AdvisoryGenerator + 'static,
{
    AccreditationService::new(
        Arc::new(model()),
        Arc::new(generator),
        AssessmentSettings::default(),
    )
}

/// Generator that records requests and replays a canned outcome.
pub(super) struct RecordingAdvisor {
    reply: Result<String, AdvisoryGenerationError>,
    requests: Mutex<Vec<AdvisoryRequest>>,
}

impl RecordingAdvisor {
    pub(super) fn replying(content: &str) -> Self {
        Self {
            reply: Ok(content.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn failing(error: AdvisoryGenerationError) -> Self {
        Self {
            reply: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn requests(&self) -> Vec<AdvisoryRequest> {
        self.requests.lock().expect("advisor mutex poisoned").clone()
    }
}

impl AdvisoryGenerator for RecordingAdvisor {
    async fn generate(
        &self,
        request: AdvisoryRequest,
    ) -> Result<AdvisoryResponse, AdvisoryGenerationError> {
        self.requests
            .lock()
            .expect("advisor mutex poisoned")
            .push(request);
        self.reply
            .clone()
            .map(|content| AdvisoryResponse { content })
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}
