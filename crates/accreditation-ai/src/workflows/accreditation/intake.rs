use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::catalog;
use super::domain::Rating;

/// Answer sheet rows could not be turned into questionnaire ratings.
#[derive(Debug, thiserror::Error)]
pub enum AnswerSheetError {
    #[error("failed to open answer sheet: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse answer sheet: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unknown questionnaire item '{item}'")]
    UnknownItem { row: usize, item: String },
    #[error("row {row}: '{value}' is not a valid rating for {item}")]
    InvalidRating {
        row: usize,
        item: String,
        value: String,
    },
    #[error("row {row}: {item} already answered")]
    Duplicate { row: usize, item: &'static str },
}

/// Read an `Item,Rating` answer sheet from disk.
pub fn read_answer_sheet(path: &Path) -> Result<BTreeMap<String, Rating>, AnswerSheetError> {
    let file = File::open(path)?;
    parse_answer_sheet(file)
}

/// Parse an answer sheet, normalizing item codes to catalog keys.
///
/// Row numbers in errors count the header as row 1.
pub fn parse_answer_sheet<R: Read>(reader: R) -> Result<BTreeMap<String, Rating>, AnswerSheetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut answers = BTreeMap::new();

    for (index, record) in csv_reader.deserialize::<AnswerRow>().enumerate() {
        let row = index + 2;
        let AnswerRow { item, rating } = record?;
        let Some(item) = item else {
            continue;
        };

        let definition = catalog::lookup(&item).ok_or_else(|| AnswerSheetError::UnknownItem {
            row,
            item: item.clone(),
        })?;
        let value = rating.unwrap_or_default();
        let parsed = Rating::parse(&value).ok_or_else(|| AnswerSheetError::InvalidRating {
            row,
            item: definition.key.to_string(),
            value,
        })?;

        if answers.insert(definition.key.to_string(), parsed).is_some() {
            return Err(AnswerSheetError::Duplicate {
                row,
                item: definition.key,
            });
        }
    }

    Ok(answers)
}

#[derive(Debug, Deserialize)]
struct AnswerRow {
    #[serde(rename = "Item", default, deserialize_with = "empty_string_as_none")]
    item: Option<String>,
    #[serde(rename = "Rating", default, deserialize_with = "empty_string_as_none")]
    rating: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
