use crate::infra::{build_service, parse_discipline};
use accreditation_ai::config::AppConfig;
use accreditation_ai::error::AppError;
use accreditation_ai::workflows::accreditation::{
    read_answer_sheet, AdvisoryOutcome, CatalogView, Discipline, EnrolmentFigures,
    EvaluationReport, SelfStudySubmission,
};
use clap::Args;
use std::fmt;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Institution preparing the self-study
    #[arg(long)]
    pub(crate) institution: String,
    /// Programme under review
    #[arg(long)]
    pub(crate) programme: String,
    /// Discipline grouping (Computing, Education, Engineering, Management, Science)
    #[arg(long, value_parser = parse_discipline)]
    pub(crate) discipline: Discipline,
    /// Total students enrolled on the programme
    #[arg(long)]
    pub(crate) students: u32,
    /// Core academic staff attached to the programme
    #[arg(long)]
    pub(crate) core_staff: u32,
    /// CSV answer sheet with `Item,Rating` columns
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Skip the advisory generation call
    #[arg(long)]
    pub(crate) skip_advisory: bool,
    /// Print the evaluation as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_assessment(args: AssessArgs) -> Result<(), AppError> {
    let AssessArgs {
        institution,
        programme,
        discipline,
        students,
        core_staff,
        answers,
        skip_advisory,
        json,
    } = args;

    let config = AppConfig::load()?;
    let service = build_service(&config)?;

    let submission = SelfStudySubmission {
        institution,
        programme,
        discipline,
        enrolment: EnrolmentFigures {
            students,
            core_staff,
        },
        answers: read_answer_sheet(&answers)?,
    };

    let report = service.evaluate(&submission, !skip_advisory).await?;
    if json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
        println!("{rendered}");
    } else {
        print!("{}", render_evaluation(&report));
    }
    Ok(())
}

pub(crate) fn run_catalog() {
    print!("{}", render_catalog(&CatalogView::current()));
}

pub(crate) fn render_evaluation(report: &EvaluationReport) -> String {
    EvaluationText(report).to_string()
}

pub(crate) fn render_catalog(catalog: &CatalogView) -> String {
    CatalogText(catalog).to_string()
}

struct EvaluationText<'a>(&'a EvaluationReport);

impl fmt::Display for EvaluationText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let assessment = &self.0.assessment;

        writeln!(f, "Accreditation readiness report")?;
        writeln!(f, "Institution: {}", assessment.institution)?;
        writeln!(f, "Programme: {}", assessment.programme)?;
        writeln!(f, "Discipline: {}", assessment.discipline)?;
        writeln!(f, "Staff-student ratio: {}", assessment.staff_ratio)?;

        writeln!(f, "\nSection scores")?;
        for entry in &assessment.scores.sections {
            let weight = match entry.weight {
                Some(weight) => format!("weight {:.0}%", weight * 100.0),
                None => "not weighted".to_string(),
            };
            writeln!(
                f,
                "- {:<18} {:>6.2}% ({weight})",
                entry.section.label(),
                entry.score
            )?;
        }
        writeln!(f, "Self Study Score: {:.2}%", assessment.scores.composite)?;
        writeln!(
            f,
            "Predicted Accreditation Status: {}",
            assessment.predicted_status
        )?;

        writeln!(f, "\nHigh-impact weaknesses")?;
        if assessment.weaknesses.is_empty() {
            writeln!(f, "- none identified")?;
        }
        for (rank, weakness) in assessment.weaknesses.iter().enumerate() {
            writeln!(
                f,
                "{}. {} ({}, impact {:.3})",
                rank + 1,
                weakness.title(),
                weakness.value.label(),
                weakness.impact
            )?;
        }

        match &self.0.advisory {
            AdvisoryOutcome::Generated(advisory) => {
                writeln!(
                    f,
                    "\nAdvisory report ({}, generated {})",
                    advisory.model,
                    advisory.generated_at.format("%Y-%m-%d %H:%M UTC")
                )?;
                writeln!(f, "{}", advisory.content.trim_end())
            }
            AdvisoryOutcome::Failed { error } => {
                writeln!(f, "\nAdvisory report unavailable: {error}")
            }
            AdvisoryOutcome::Skipped => writeln!(f, "\nAdvisory report skipped."),
        }
    }
}

struct CatalogText<'a>(&'a CatalogView);

impl fmt::Display for CatalogText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Self-study questionnaire")?;
        for section in &self.0.sections {
            writeln!(f, "\n{} ({} items)", section.label, section.items.len())?;
            for item in &section.items {
                writeln!(f, "  {:<5} {:<40} {}", item.code, item.key, item.question)?;
            }
        }
        writeln!(f, "\nDisciplines: {}", self.0.disciplines.join(", "))?;
        writeln!(
            f,
            "Ratings: 1 = Fully Implemented, 0.5 = Partially Implemented, 0 = Not Implemented"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accreditation_ai::workflows::accreditation::scoring::composite_weight;
    use accreditation_ai::workflows::accreditation::{
        AdvisoryReport, Assessment, Rating, ScoreReport, Section, SectionScore, Weakness,
    };
    use chrono::{TimeZone, Utc};

    fn assessment() -> Assessment {
        let sections = Section::ALL
            .into_iter()
            .map(|section| SectionScore {
                section,
                score: if section == Section::Academic { 100.0 } else { 50.0 },
                weight: composite_weight(section),
            })
            .collect();
        Assessment {
            institution: "University of Nigeria".to_string(),
            programme: "Mechanical Engineering".to_string(),
            discipline: Discipline::Engineering,
            staff_ratio: EnrolmentFigures {
                students: 100,
                core_staff: 3,
            }
            .staff_ratio()
            .expect("valid enrolment"),
            scores: ScoreReport {
                sections,
                composite: 65.0,
            },
            predicted_status: "Interim Accreditation".to_string(),
            weaknesses: vec![Weakness {
                key: "laboratory_equipment_adequate",
                value: Rating::NotImplemented,
                impact: 0.125,
            }],
        }
    }

    #[test]
    fn renders_scores_weaknesses_and_advisory() {
        let report = EvaluationReport {
            assessment: assessment(),
            advisory: AdvisoryOutcome::Generated(AdvisoryReport {
                model: "gpt-4.1-mini".to_string(),
                content: "Replace workshop lathes.\n".to_string(),
                generated_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap(),
            }),
        };

        let text = render_evaluation(&report);
        assert!(text.contains("Staff-student ratio: 33.33 students per core staff (Partially Implemented)"));
        assert!(text.contains("Academic Content"));
        assert!(text.contains("(not weighted)"));
        assert!(text.contains("Self Study Score: 65.00%"));
        assert!(text.contains("Predicted Accreditation Status: Interim Accreditation"));
        assert!(text.contains("1. Laboratory Equipment Adequate (Not Implemented, impact 0.125)"));
        assert!(text.contains("Advisory report (gpt-4.1-mini, generated 2025-03-01 09:30 UTC)"));
        assert!(text.ends_with("Replace workshop lathes.\n"));
    }

    #[test]
    fn renders_failed_and_skipped_advisories() {
        let failed = EvaluationReport {
            assessment: assessment(),
            advisory: AdvisoryOutcome::Failed {
                error: "advisory service returned 500: boom".to_string(),
            },
        };
        assert!(render_evaluation(&failed)
            .contains("Advisory report unavailable: advisory service returned 500: boom"));

        let skipped = EvaluationReport {
            assessment: assessment(),
            advisory: AdvisoryOutcome::Skipped,
        };
        assert!(render_evaluation(&skipped).contains("Advisory report skipped."));
    }

    #[test]
    fn catalog_lists_every_section() {
        let text = render_catalog(&CatalogView::current());
        assert!(text.contains("Academic Content (13 items)"));
        assert!(text.contains("Research (4 items)"));
        assert!(text.contains("fd3"));
        assert!(text.contains("Disciplines: Computing, Education, Engineering, Management, Science"));
    }
}
