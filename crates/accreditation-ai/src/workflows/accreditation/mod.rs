//! Programme accreditation readiness: self-study scoring, outcome prediction,
//! weakness ranking, and advisory generation.

pub mod advisory;
pub mod catalog;
pub mod domain;
pub mod intake;
pub mod prediction;
pub mod router;
pub mod scoring;
pub mod service;
pub mod weakness;

#[cfg(test)]
mod tests;

pub use advisory::{
    build_prompt, AdvisoryGenerationError, AdvisoryGenerator, AdvisoryReport, AdvisoryRequest,
    AdvisoryResponse, ChatMessage, ChatRole, OpenAiAdvisor,
};
pub use catalog::{CatalogView, Discipline, ItemDefinition, Section, QUESTIONNAIRE};
pub use domain::{
    AnswerSet, AnswerValue, EnrolmentFigures, Rating, SelfStudySubmission, StaffRatio,
    SubmissionError,
};
pub use intake::{parse_answer_sheet, read_answer_sheet, AnswerSheetError};
pub use prediction::{
    AccreditationModel, ArtifactError, FeatureVector, ImportanceSource, ImportanceTable,
    ModelSummary, Prediction, SchemaMismatchError, TrainingColumnSchema, UnsupportedModelError,
};
pub use router::{accreditation_router, EvaluationRequest};
pub use scoring::{
    compute_composite, compute_section_score, InvalidSectionError, ScoreReport, SectionAnswers,
    SectionScore,
};
pub use service::{
    AccreditationService, AdvisoryOutcome, Assessment, AssessmentError, AssessmentSettings,
    EvaluationReport,
};
pub use weakness::{rank_weaknesses, Weakness, DEFAULT_TOP_WEAKNESSES};
