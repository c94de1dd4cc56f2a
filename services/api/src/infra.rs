use accreditation_ai::config::AppConfig;
use accreditation_ai::error::AppError;
use accreditation_ai::workflows::accreditation::{
    AccreditationModel, AccreditationService, AssessmentSettings, Discipline, OpenAiAdvisor,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load the model artifacts and wire the OpenAI advisor into the service.
pub(crate) fn build_service(
    config: &AppConfig,
) -> Result<AccreditationService<OpenAiAdvisor>, AppError> {
    let model = AccreditationModel::load(&config.artifacts)?;
    let advisor = OpenAiAdvisor::new(&config.advisory)?;
    if !advisor.is_configured() {
        warn!("OPENAI_API_KEY not set; advisory reports will be unavailable");
    }

    Ok(AccreditationService::new(
        Arc::new(model),
        Arc::new(advisor),
        AssessmentSettings::from_config(config),
    ))
}

pub(crate) fn parse_discipline(raw: &str) -> Result<Discipline, String> {
    Discipline::parse(raw).ok_or_else(|| {
        let known: Vec<&str> = Discipline::ALL.into_iter().map(Discipline::name).collect();
        format!("unknown discipline '{raw}' (expected one of: {})", known.join(", "))
    })
}
