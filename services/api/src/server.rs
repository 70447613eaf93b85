use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryAccountRepository, InMemoryElectionRepository};
use crate::routes::with_monitoring_routes;
use abuja_watch::auth::AuthService;
use abuja_watch::config::AppConfig;
use abuja_watch::error::AppError;
use abuja_watch::monitoring::{ApiState, MonitoringService};
use abuja_watch::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

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

    let repository = Arc::new(InMemoryElectionRepository::default());
    let accounts = Arc::new(InMemoryAccountRepository::default());
    let auth = Arc::new(AuthService::new(accounts, config.auth.session_ttl()));
    match &config.auth.admin_password {
        Some(password) => {
            auth.bootstrap_admin(&config.auth.admin_username, password)?;
        }
        None => warn!("APP_ADMIN_PASSWORD not set; no administrator can log in"),
    }
    let monitoring = Arc::new(MonitoringService::new(repository));

    let app = with_monitoring_routes(ApiState::new(monitoring, auth))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "election monitoring service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
