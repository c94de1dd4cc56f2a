use crate::cli::ServeArgs;
use crate::infra::{build_service, AppState};
use crate::routes::with_accreditation_routes;
use accreditation_ai::config::AppConfig;
use accreditation_ai::error::AppError;
use accreditation_ai::telemetry;
use accreditation_ai::workflows::accreditation::ModelSummary;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(build_service(&config)?);
    let summary = ModelSummary::from(service.model());
    info!(
        columns = summary.columns,
        classes = ?summary.classes,
        "accreditation model ready"
    );

    let app = with_accreditation_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "accreditation advisory service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
