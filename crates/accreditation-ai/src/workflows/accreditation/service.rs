use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::advisory::{
    build_prompt, AdvisoryGenerationError, AdvisoryGenerator, AdvisoryReport, AdvisoryRequest,
};
use super::catalog::Discipline;
use super::domain::{AnswerSet, SelfStudySubmission, StaffRatio, SubmissionError};
use super::prediction::{AccreditationModel, SchemaMismatchError};
use super::scoring::{InvalidSectionError, ScoreReport};
use super::weakness::{rank_weaknesses, Weakness, DEFAULT_TOP_WEAKNESSES};
use crate::config::AppConfig;

/// Tunables applied to every evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentSettings {
    pub top_weaknesses: usize,
    pub advisory_model: String,
    pub temperature: f32,
}

impl AssessmentSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            top_weaknesses: config.assessment.top_weaknesses,
            advisory_model: config.advisory.model.clone(),
            temperature: config.advisory.temperature,
        }
    }
}

impl Default for AssessmentSettings {
    fn default() -> Self {
        Self {
            top_weaknesses: DEFAULT_TOP_WEAKNESSES,
            advisory_model: "gpt-4.1-mini".to_string(),
            temperature: 0.7,
        }
    }
}

/// Deterministic half of an evaluation: scores, prediction, and weaknesses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub institution: String,
    pub programme: String,
    pub discipline: Discipline,
    pub staff_ratio: StaffRatio,
    pub scores: ScoreReport,
    pub predicted_status: String,
    pub weaknesses: Vec<Weakness>,
}

/// Outcome of the narrative step, reported alongside the assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdvisoryOutcome {
    Generated(AdvisoryReport),
    Failed { error: String },
    Skipped,
}

impl AdvisoryOutcome {
    pub fn report(&self) -> Option<&AdvisoryReport> {
        match self {
            AdvisoryOutcome::Generated(report) => Some(report),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub assessment: Assessment,
    pub advisory: AdvisoryOutcome,
}

/// Service composing the model context, the advisory generator, and settings.
pub struct AccreditationService<G> {
    model: Arc<AccreditationModel>,
    generator: Arc<G>,
    settings: AssessmentSettings,
}

impl<G> AccreditationService<G>
where
    G: AdvisoryGenerator + 'static,
{
    pub fn new(model: Arc<AccreditationModel>, generator: Arc<G>, settings: AssessmentSettings) -> Self {
        Self {
            model,
            generator,
            settings,
        }
    }

    pub fn model(&self) -> &AccreditationModel {
        &self.model
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn settings(&self) -> &AssessmentSettings {
        &self.settings
    }

    /// Validate, score, encode, predict, and rank weaknesses.
    pub fn assess(&self, submission: &SelfStudySubmission) -> Result<Assessment, AssessmentError> {
        let staff_ratio = submission.validate()?;
        let answers = AnswerSet::from_submission(submission, &staff_ratio)?;

        let scores = ScoreReport::from_answers(&answers)?;
        let vector = self.model.encode(&answers);
        let prediction = self.model.predict(&vector)?;
        let weaknesses: Vec<Weakness> =
            rank_weaknesses(&answers, &prediction.importance, self.settings.top_weaknesses)
                .collect();

        info!(
            institution = %submission.institution,
            programme = %submission.programme,
            composite = scores.composite,
            predicted_status = %prediction.label,
            weaknesses = weaknesses.len(),
            "self-study assessed"
        );

        Ok(Assessment {
            institution: submission.institution.trim().to_string(),
            programme: submission.programme.trim().to_string(),
            discipline: submission.discipline,
            staff_ratio,
            scores,
            predicted_status: prediction.label,
            weaknesses,
        })
    }

    /// Request the narrative advisory for a completed assessment. Not retried.
    pub async fn advise(
        &self,
        assessment: &Assessment,
    ) -> Result<AdvisoryReport, AdvisoryGenerationError> {
        let prompt = build_prompt(
            &assessment.institution,
            &assessment.programme,
            assessment.discipline.name(),
            &assessment.scores,
            &assessment.predicted_status,
            &assessment.weaknesses,
        );
        let request = AdvisoryRequest::new(
            self.settings.advisory_model.clone(),
            self.settings.temperature,
            prompt,
        );

        let response = self.generator.generate(request).await?;
        Ok(AdvisoryReport {
            model: self.settings.advisory_model.clone(),
            content: response.content,
            generated_at: Utc::now(),
        })
    }

    /// Assess and, when requested, advise. Advisory failures are reported
    /// in the outcome rather than discarding the assessment.
    pub async fn evaluate(
        &self,
        submission: &SelfStudySubmission,
        include_advisory: bool,
    ) -> Result<EvaluationReport, AssessmentError> {
        let assessment = self.assess(submission)?;

        let advisory = if include_advisory {
            match self.advise(&assessment).await {
                Ok(report) => AdvisoryOutcome::Generated(report),
                Err(err) => {
                    warn!(%err, "advisory generation failed; returning assessment only");
                    AdvisoryOutcome::Failed {
                        error: err.to_string(),
                    }
                }
            }
        } else {
            AdvisoryOutcome::Skipped
        };

        Ok(EvaluationReport {
            assessment,
            advisory,
        })
    }
}

/// Error raised while assessing a submission.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Section(#[from] InvalidSectionError),
    #[error(transparent)]
    Schema(#[from] SchemaMismatchError),
}
