use serde::{Deserialize, Serialize};

use super::catalog::Section;
use super::domain::{AnswerSet, Rating};

/// Composite weights in basis points so they sum to exactly 10_000.
/// Research is scored but deliberately carries no weight.
const COMPOSITE_WEIGHTS_BP: [(Section, u32); 5] = [
    (Section::Academic, 3_000),
    (Section::Staffing, 2_800),
    (Section::Facilities, 2_200),
    (Section::Library, 1_500),
    (Section::Funding, 500),
];

const BASIS_POINTS: u32 = 10_000;

/// Composite weight for a section, `None` for sections outside the composite.
pub fn composite_weight(section: Section) -> Option<f64> {
    COMPOSITE_WEIGHTS_BP
        .iter()
        .find(|(candidate, _)| *candidate == section)
        .map(|(_, bp)| f64::from(*bp) / f64::from(BASIS_POINTS))
}

pub fn composite_weight_total() -> f64 {
    let total: u32 = COMPOSITE_WEIGHTS_BP.iter().map(|(_, bp)| bp).sum();
    f64::from(total) / f64::from(BASIS_POINTS)
}

/// Answered ratings for one section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionAnswers {
    pub section: Section,
    pub ratings: Vec<Rating>,
}

impl SectionAnswers {
    pub fn new(section: Section, ratings: Vec<Rating>) -> Self {
        Self { section, ratings }
    }

    pub fn from_answers(section: Section, answers: &AnswerSet) -> Self {
        Self::new(section, answers.section_ratings(section))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("section '{}' has no answered items to average", .section.label())]
pub struct InvalidSectionError {
    pub section: Section,
}

/// Mean item value scaled to 0–100.
pub fn compute_section_score(answers: &SectionAnswers) -> Result<f64, InvalidSectionError> {
    if answers.ratings.is_empty() {
        return Err(InvalidSectionError {
            section: answers.section,
        });
    }

    let total: f64 = answers.ratings.iter().map(|rating| rating.value()).sum();
    Ok(total / answers.ratings.len() as f64 * 100.0)
}

/// Weighted composite over the five weighted sections. Sections missing from
/// `sections` are treated as empty.
pub fn compute_composite(sections: &[SectionScore]) -> Result<f64, InvalidSectionError> {
    let mut weighted_bp = 0.0;
    for (section, bp) in COMPOSITE_WEIGHTS_BP {
        let score = sections
            .iter()
            .find(|entry| entry.section == section)
            .map(|entry| entry.score)
            .ok_or(InvalidSectionError { section })?;
        weighted_bp += score * f64::from(bp);
    }
    Ok(weighted_bp / f64::from(BASIS_POINTS))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionScore {
    pub section: Section,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// Per-section averages plus the composite self-study score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub sections: Vec<SectionScore>,
    pub composite: f64,
}

impl ScoreReport {
    /// Scores every section, failing on the first empty one.
    pub fn from_answers(answers: &AnswerSet) -> Result<Self, InvalidSectionError> {
        let sections = Section::ALL
            .into_iter()
            .map(|section| {
                let score = compute_section_score(&SectionAnswers::from_answers(section, answers))?;
                Ok(SectionScore {
                    section,
                    score,
                    weight: composite_weight(section),
                })
            })
            .collect::<Result<Vec<_>, InvalidSectionError>>()?;

        let composite = compute_composite(&sections)?;
        Ok(Self {
            sections,
            composite,
        })
    }

    pub fn section(&self, section: Section) -> Option<f64> {
        self.sections
            .iter()
            .find(|entry| entry.section == section)
            .map(|entry| entry.score)
    }
}
