use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::accreditation::{
    AdvisoryGenerationError, AnswerSheetError, ArtifactError, AssessmentError,
};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Artifact(ArtifactError),
    Intake(AnswerSheetError),
    Assessment(AssessmentError),
    Advisory(AdvisoryGenerationError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Artifact(err) => write!(f, "model artifact error: {}", err),
            AppError::Intake(err) => write!(f, "answer sheet error: {}", err),
            AppError::Assessment(err) => write!(f, "assessment error: {}", err),
            AppError::Advisory(err) => write!(f, "advisory error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Artifact(err) => Some(err),
            AppError::Intake(err) => Some(err),
            AppError::Assessment(err) => Some(err),
            AppError::Advisory(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Intake(_)
            | AppError::Assessment(AssessmentError::Submission(_))
            | AppError::Assessment(AssessmentError::Section(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Advisory(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Artifact(_)
            | AppError::Assessment(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ArtifactError> for AppError {
    fn from(value: ArtifactError) -> Self {
        Self::Artifact(value)
    }
}

impl From<AnswerSheetError> for AppError {
    fn from(value: AnswerSheetError) -> Self {
        Self::Intake(value)
    }
}

impl From<AssessmentError> for AppError {
    fn from(value: AssessmentError) -> Self {
        Self::Assessment(value)
    }
}

impl From<AdvisoryGenerationError> for AppError {
    fn from(value: AdvisoryGenerationError) -> Self {
        Self::Advisory(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::accreditation::{Section, SubmissionError};
    use crate::workflows::accreditation::{InvalidSectionError, SchemaMismatchError};

    #[test]
    fn maps_client_errors_to_unprocessable() {
        let response =
            AppError::from(AssessmentError::from(SubmissionError::NoCoreStaff)).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = AppError::from(AssessmentError::from(InvalidSectionError {
            section: Section::Library,
        }))
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn maps_schema_drift_to_internal_error() {
        let response = AppError::from(AssessmentError::from(SchemaMismatchError::VectorLength {
            expected: 44,
            actual: 43,
        }))
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn display_prefixes_the_failing_layer() {
        let err = AppError::from(AdvisoryGenerationError::NotConfigured);
        assert!(err.to_string().starts_with("advisory error:"));
    }
}
