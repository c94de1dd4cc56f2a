//! Advisory prompt assembly and the text-generation boundary.

mod openai;

pub use openai::OpenAiAdvisor;

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::scoring::ScoreReport;
use super::weakness::Weakness;

pub const ADVISOR_ROLE: &str = "You are an accreditation advisory expert.";

/// Assemble the advisory prompt. Deterministic for identical inputs.
pub fn build_prompt(
    institution: &str,
    programme: &str,
    discipline: &str,
    score_report: &ScoreReport,
    predicted_label: &str,
    weaknesses: &[Weakness],
) -> String {
    let top_weaknesses = weaknesses
        .iter()
        .map(|weakness| format!("- {}", weakness.title()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{ADVISOR_ROLE}

Institution: {institution}
Programme: {programme}
Discipline: {discipline}

Self Study Score: {composite:.2}%
Predicted Accreditation Status: {predicted_label}

The following high-impact weaknesses strongly influenced this prediction:

{top_weaknesses}

Provide:
1. Strategic preparation advice.
2. Section-by-section improvement plan.
3. Documentation checklist.
4. Risk mitigation strategy.
5. 90-day roadmap.
",
        composite = score_report.composite,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Chat-completion request handed to the text-generation collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

impl AdvisoryRequest {
    /// System message framing the advisor, user message carrying the prompt.
    pub fn new(model: impl Into<String>, temperature: f32, prompt: String) -> Self {
        Self {
            model: model.into(),
            messages: vec![
                ChatMessage {
                    role: ChatRole::System,
                    content: ADVISOR_ROLE.to_string(),
                },
                ChatMessage {
                    role: ChatRole::User,
                    content: prompt,
                },
            ],
            temperature,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryResponse {
    pub content: String,
}

/// External narrative generator (OpenAI in production, fakes in tests).
pub trait AdvisoryGenerator: Send + Sync {
    fn generate(
        &self,
        request: AdvisoryRequest,
    ) -> impl Future<Output = Result<AdvisoryResponse, AdvisoryGenerationError>> + Send;
}

/// Advisory generation failed; never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdvisoryGenerationError {
    #[error("advisory generation is not configured (OPENAI_API_KEY missing)")]
    NotConfigured,
    #[error("advisory transport failed: {0}")]
    Transport(String),
    #[error("advisory service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("advisory response malformed: {0}")]
    MalformedResponse(String),
}

/// Narrative report produced for an assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryReport {
    pub model: String,
    pub content: String,
    pub generated_at: DateTime<Utc>,
}
