use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::catalog::{self, Discipline, Section, DISCIPLINE_KEY, STAFF_RATIO_KEY};

/// Ordinal answer for a questionnaire item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum Rating {
    FullyImplemented,
    PartiallyImplemented,
    NotImplemented,
}

impl Rating {
    pub const fn value(self) -> f64 {
        match self {
            Rating::FullyImplemented => 1.0,
            Rating::PartiallyImplemented => 0.5,
            Rating::NotImplemented => 0.0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Rating::FullyImplemented => "Fully Implemented",
            Rating::PartiallyImplemented => "Partially Implemented",
            Rating::NotImplemented => "Not Implemented",
        }
    }

    /// Anything short of full implementation counts against the programme.
    pub const fn is_deficient(self) -> bool {
        !matches!(self, Rating::FullyImplemented)
    }

    /// Parse a numeric value or a rating label.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if let Ok(value) = trimmed.parse::<f64>() {
            return Self::try_from(value).ok();
        }
        [
            Rating::FullyImplemented,
            Rating::PartiallyImplemented,
            Rating::NotImplemented,
        ]
        .into_iter()
        .find(|rating| rating.label().eq_ignore_ascii_case(trimmed))
    }
}

impl TryFrom<f64> for Rating {
    type Error = InvalidRating;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value == 1.0 {
            Ok(Rating::FullyImplemented)
        } else if value == 0.5 {
            Ok(Rating::PartiallyImplemented)
        } else if value == 0.0 {
            Ok(Rating::NotImplemented)
        } else {
            Err(InvalidRating(value))
        }
    }
}

impl From<Rating> for f64 {
    fn from(rating: Rating) -> Self {
        rating.value()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("rating must be 1, 0.5, or 0 (got {0})")]
pub struct InvalidRating(pub f64);

/// Enrolment figures used to derive staff-student ratio compliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrolmentFigures {
    pub students: u32,
    pub core_staff: u32,
}

impl EnrolmentFigures {
    pub fn staff_ratio(&self) -> Result<StaffRatio, SubmissionError> {
        if self.students == 0 {
            return Err(SubmissionError::NoStudents);
        }
        if self.core_staff == 0 {
            return Err(SubmissionError::NoCoreStaff);
        }

        let ratio = f64::from(self.students) / f64::from(self.core_staff);
        Ok(StaffRatio {
            students: self.students,
            core_staff: self.core_staff,
            ratio,
            compliance: ratio_compliance(ratio),
        })
    }
}

/// Benchmark bands: at most 30 students per core staff is compliant, up to 40 partial.
pub fn ratio_compliance(ratio: f64) -> Rating {
    if ratio <= 30.0 {
        Rating::FullyImplemented
    } else if ratio <= 40.0 {
        Rating::PartiallyImplemented
    } else {
        Rating::NotImplemented
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StaffRatio {
    pub students: u32,
    pub core_staff: u32,
    pub ratio: f64,
    pub compliance: Rating,
}

/// Self-study questionnaire as submitted by a programme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfStudySubmission {
    pub institution: String,
    pub programme: String,
    pub discipline: Discipline,
    pub enrolment: EnrolmentFigures,
    /// Item key or form code to rating. Every catalog item must be answered.
    #[serde(default)]
    pub answers: BTreeMap<String, Rating>,
}

impl SelfStudySubmission {
    pub fn validate(&self) -> Result<StaffRatio, SubmissionError> {
        if self.institution.trim().is_empty() {
            return Err(SubmissionError::MissingInstitution);
        }
        if self.programme.trim().is_empty() {
            return Err(SubmissionError::MissingProgramme);
        }
        self.enrolment.staff_ratio()
    }
}

/// Value held against an answer key.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerValue {
    Rating(Rating),
    Category(String),
}

impl AnswerValue {
    pub fn as_rating(&self) -> Option<Rating> {
        match self {
            AnswerValue::Rating(rating) => Some(*rating),
            AnswerValue::Category(_) => None,
        }
    }
}

/// Normalized answers keyed by training column name, in insertion order.
///
/// Only catalog items and the two derived fields are accepted, so nothing
/// unexpected can reach the encoder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerSet {
    entries: Vec<(&'static str, AnswerValue)>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the answer set in catalog order, followed by the derived fields.
    /// Every catalog item must carry a rating.
    pub fn from_submission(
        submission: &SelfStudySubmission,
        staff_ratio: &StaffRatio,
    ) -> Result<Self, SubmissionError> {
        let mut resolved: BTreeMap<&'static str, Rating> = BTreeMap::new();
        for (raw_key, rating) in &submission.answers {
            let item = catalog::lookup(raw_key)
                .ok_or_else(|| SubmissionError::UnknownItem(raw_key.clone()))?;
            if resolved.insert(item.key, *rating).is_some() {
                return Err(SubmissionError::DuplicateAnswer(item.key));
            }
        }

        let mut answers = Self::new();
        for item in catalog::QUESTIONNAIRE {
            let rating = resolved
                .get(item.key)
                .ok_or(SubmissionError::Unanswered(item.key))?;
            answers.insert_rating(item.key, *rating)?;
        }
        answers.insert_rating(STAFF_RATIO_KEY, staff_ratio.compliance)?;
        answers.set_discipline(submission.discipline.name());
        Ok(answers)
    }

    /// Record a rating for a catalog item or the staff ratio field.
    pub fn insert_rating(&mut self, key: &str, rating: Rating) -> Result<(), SubmissionError> {
        let key = if key == STAFF_RATIO_KEY {
            STAFF_RATIO_KEY
        } else {
            catalog::QUESTIONNAIRE
                .iter()
                .find(|item| item.key == key)
                .map(|item| item.key)
                .ok_or_else(|| SubmissionError::UnknownItem(key.to_string()))?
        };
        self.upsert(key, AnswerValue::Rating(rating));
        Ok(())
    }

    pub fn set_discipline(&mut self, discipline: &str) {
        self.upsert(
            DISCIPLINE_KEY,
            AnswerValue::Category(discipline.trim().to_string()),
        );
    }

    fn upsert(&mut self, key: &'static str, value: AnswerValue) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == key)
            .map(|(_, value)| value)
    }

    pub fn rating(&self, key: &str) -> Option<Rating> {
        self.get(key).and_then(AnswerValue::as_rating)
    }

    pub fn discipline(&self) -> Option<&str> {
        match self.get(DISCIPLINE_KEY) {
            Some(AnswerValue::Category(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &AnswerValue)> + '_ {
        self.entries.iter().map(|(key, value)| (*key, value))
    }

    /// Ratings answered for the given section, in catalog order.
    pub fn section_ratings(&self, section: Section) -> Vec<Rating> {
        section
            .items()
            .filter_map(|item| self.rating(item.key))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Submission rejected before scoring.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmissionError {
    #[error("institution must be provided")]
    MissingInstitution,
    #[error("programme must be provided")]
    MissingProgramme,
    #[error("student enrolment must be at least 1")]
    NoStudents,
    #[error("core academic staff count must be at least 1")]
    NoCoreStaff,
    #[error("unknown questionnaire item '{0}'")]
    UnknownItem(String),
    #[error("questionnaire item '{0}' answered more than once")]
    DuplicateAnswer(&'static str),
    #[error("questionnaire item '{0}' has not been answered")]
    Unanswered(&'static str),
}

impl fmt::Display for StaffRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} students per core staff ({})",
            self.ratio,
            self.compliance.label()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> SelfStudySubmission {
        SelfStudySubmission {
            institution: "University of Ibadan".to_string(),
            programme: "Computer Science".to_string(),
            discipline: Discipline::Computing,
            enrolment: EnrolmentFigures {
                students: 120,
                core_staff: 5,
            },
            answers: BTreeMap::new(),
        }
    }

    #[test]
    fn ratio_bands_follow_benchmarks() {
        let cases = [(100, 4, Rating::FullyImplemented), (100, 3, Rating::PartiallyImplemented), (200, 2, Rating::NotImplemented)];
        for (students, core_staff, expected) in cases {
            let ratio = EnrolmentFigures {
                students,
                core_staff,
            }
            .staff_ratio()
            .expect("valid enrolment");
            assert_eq!(ratio.compliance, expected, "{students}/{core_staff}");
        }
    }

    #[test]
    fn ratio_boundaries_are_inclusive() {
        assert_eq!(ratio_compliance(30.0), Rating::FullyImplemented);
        assert_eq!(ratio_compliance(40.0), Rating::PartiallyImplemented);
        assert_eq!(ratio_compliance(40.01), Rating::NotImplemented);
    }

    #[test]
    fn zero_staff_is_rejected() {
        let err = EnrolmentFigures {
            students: 10,
            core_staff: 0,
        }
        .staff_ratio()
        .expect_err("division guarded");
        assert_eq!(err, SubmissionError::NoCoreStaff);
    }

    #[test]
    fn rating_parses_values_and_labels() {
        assert_eq!(Rating::parse("0.5"), Some(Rating::PartiallyImplemented));
        assert_eq!(Rating::parse("not implemented"), Some(Rating::NotImplemented));
        assert_eq!(Rating::parse("0.75"), None);
        assert!(Rating::try_from(2.0).is_err());
    }

    #[test]
    fn rating_deserializes_from_numbers_only_in_range() {
        let rating: Rating = serde_json::from_str("0.5").expect("valid rating");
        assert_eq!(rating, Rating::PartiallyImplemented);
        assert!(serde_json::from_str::<Rating>("0.3").is_err());
        assert_eq!(serde_json::to_string(&Rating::FullyImplemented).unwrap(), "1.0");
    }

    fn answered(submission: &mut SelfStudySubmission) {
        for item in catalog::QUESTIONNAIRE {
            submission
                .answers
                .insert(item.code.to_string(), Rating::PartiallyImplemented);
        }
    }

    #[test]
    fn answer_set_normalizes_codes_and_appends_derived_fields() {
        let mut submission = submission();
        answered(&mut submission);
        submission.answers.remove("s1");
        submission
            .answers
            .insert("proportion_core_staff_sufficient".to_string(), Rating::NotImplemented);
        let ratio = submission.validate().expect("valid submission");

        let answers = AnswerSet::from_submission(&submission, &ratio).expect("answers build");
        let keys: Vec<&str> = answers.iter().map(|(key, _)| key).collect();
        let mut expected: Vec<&str> = catalog::QUESTIONNAIRE.iter().map(|item| item.key).collect();
        expected.push(STAFF_RATIO_KEY);
        expected.push(DISCIPLINE_KEY);
        assert_eq!(keys, expected);
        assert_eq!(
            answers.rating("proportion_core_staff_sufficient"),
            Some(Rating::NotImplemented)
        );
        assert_eq!(answers.rating(STAFF_RATIO_KEY), Some(Rating::FullyImplemented));
        assert_eq!(answers.discipline(), Some("Computing"));
    }

    #[test]
    fn answer_set_requires_every_catalog_item() {
        let mut submission = submission();
        answered(&mut submission);
        submission.answers.remove("fd3");
        let ratio = submission.validate().expect("valid submission");

        let err = AnswerSet::from_submission(&submission, &ratio).expect_err("fd3 missing");
        assert_eq!(err, SubmissionError::Unanswered("equipment_maintenance_budget_available"));

        let err = AnswerSet::from_submission(&self::submission(), &ratio).expect_err("blank sheet");
        assert_eq!(err, SubmissionError::Unanswered("curriculum_aligned_with_BMAS"));
    }

    #[test]
    fn answer_set_rejects_unknown_and_duplicate_items() {
        let mut submission = submission();
        submission
            .answers
            .insert("campus_wifi".to_string(), Rating::FullyImplemented);
        let ratio = submission.validate().expect("valid submission");
        let err = AnswerSet::from_submission(&submission, &ratio).expect_err("unknown key");
        assert_eq!(err, SubmissionError::UnknownItem("campus_wifi".to_string()));

        let mut submission = self::submission();
        submission.answers.insert("a1".to_string(), Rating::FullyImplemented);
        submission
            .answers
            .insert("curriculum_aligned_with_BMAS".to_string(), Rating::NotImplemented);
        let err = AnswerSet::from_submission(&submission, &ratio).expect_err("duplicate key");
        assert_eq!(
            err,
            SubmissionError::DuplicateAnswer("curriculum_aligned_with_BMAS")
        );
    }

    #[test]
    fn blank_institution_is_rejected() {
        let mut submission = submission();
        submission.institution = "   ".to_string();
        assert_eq!(
            submission.validate().expect_err("blank institution"),
            SubmissionError::MissingInstitution
        );
    }
}
