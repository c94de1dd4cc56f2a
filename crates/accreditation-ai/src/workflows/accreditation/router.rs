use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::advisory::AdvisoryGenerator;
use super::catalog::CatalogView;
use super::domain::SelfStudySubmission;
use super::service::{AccreditationService, AssessmentError};

/// Evaluation request body: the submission plus the advisory toggle.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationRequest {
    #[serde(flatten)]
    pub submission: SelfStudySubmission,
    #[serde(default = "default_include_advisory")]
    pub include_advisory: bool,
}

fn default_include_advisory() -> bool {
    true
}

/// Router builder exposing the questionnaire catalog and evaluation endpoint.
pub fn accreditation_router<G>(service: Arc<AccreditationService<G>>) -> Router
where
    G: AdvisoryGenerator + 'static,
{
    Router::new()
        .route("/api/v1/accreditation/catalog", get(catalog_handler))
        .route(
            "/api/v1/accreditation/evaluations",
            post(evaluate_handler::<G>),
        )
        .with_state(service)
}

pub(crate) async fn catalog_handler() -> Response {
    (StatusCode::OK, axum::Json(CatalogView::current())).into_response()
}

pub(crate) async fn evaluate_handler<G>(
    State(service): State<Arc<AccreditationService<G>>>,
    axum::Json(request): axum::Json<EvaluationRequest>,
) -> Response
where
    G: AdvisoryGenerator + 'static,
{
    match service
        .evaluate(&request.submission, request.include_advisory)
        .await
    {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error @ (AssessmentError::Submission(_) | AssessmentError::Section(_))) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
