use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryContributorStore, InMemoryEventPublisher};
use crate::routes::with_contributor_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use heritage_admin::config::AppConfig;
use heritage_admin::error::AppError;
use heritage_admin::telemetry;
use heritage_admin::workflows::contributors::ContributorState;
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

    let store = Arc::new(InMemoryContributorStore::default());
    let events = Arc::new(InMemoryEventPublisher::default());
    let contributor_state = ContributorState::new(store, events)
        .with_default_page_size(config.paging.default_page_size);

    let app = with_contributor_routes(contributor_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "contributor workflow service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
