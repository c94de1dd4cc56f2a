use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::encoder::{SchemaDefinitionError, SchemaMismatchError};
use super::estimator::{Estimator, EstimatorError};

/// Maps classifier class indices back to accreditation status labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelDecoder {
    classes: Vec<String>,
}

impl LabelDecoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    pub fn inverse_transform(&self, class_index: usize) -> Option<&str> {
        self.classes.get(class_index).map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Model artifacts failed to load or validate.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse artifact {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("label decoder has no classes")]
    EmptyLabels,
    #[error(transparent)]
    Schema(#[from] SchemaDefinitionError),
    #[error(transparent)]
    Estimator(#[from] EstimatorError),
    #[error(transparent)]
    Mismatch(#[from] SchemaMismatchError),
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let file = File::open(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_json(BufReader::new(file), path)
}

pub(crate) fn parse_json<T: DeserializeOwned, R: Read>(
    reader: R,
    path: &Path,
) -> Result<T, ArtifactError> {
    serde_json::from_reader(reader).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Training columns are stored as a bare JSON array.
pub(crate) fn read_columns(path: &Path) -> Result<Vec<String>, ArtifactError> {
    read_json(path)
}

pub(crate) fn read_classifier(path: &Path) -> Result<Estimator, ArtifactError> {
    read_json(path)
}

pub(crate) fn read_labels(path: &Path) -> Result<LabelDecoder, ArtifactError> {
    read_json(path)
}
