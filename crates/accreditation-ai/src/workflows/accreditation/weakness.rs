use serde::Serialize;

use super::domain::{AnswerSet, Rating};
use super::prediction::ImportanceTable;

pub const DEFAULT_TOP_WEAKNESSES: usize = 10;

/// Deficient answer weighted by how much the classifier relies on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Weakness {
    pub key: &'static str,
    pub value: Rating,
    pub impact: f64,
}

impl Weakness {
    /// Human-readable item name: underscores become spaces, each word capitalized.
    pub fn title(&self) -> String {
        title_case(self.key)
    }
}

/// Deficient answers known to the importance table, highest impact first,
/// truncated to `top_n`. Equal impacts keep answer order.
pub fn rank_weaknesses(
    answers: &AnswerSet,
    importance: &ImportanceTable,
    top_n: usize,
) -> impl Iterator<Item = Weakness> {
    let mut candidates: Vec<Weakness> = answers
        .iter()
        .filter_map(|(key, value)| {
            let rating = value.as_rating().filter(|rating| rating.is_deficient())?;
            let impact = importance.get(key)?;
            Some(Weakness {
                key,
                value: rating,
                impact,
            })
        })
        .collect();

    candidates.sort_by(|a, b| b.impact.total_cmp(&a.impact));
    candidates.into_iter().take(top_n)
}

fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
