use crate::cli::ServeArgs;
use crate::infra::{self, AppState, InMemoryCandidateRepository};
use crate::routes::with_candidate_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use linkenchamba::candidates::{CandidateRepository, CandidateService, JsonFileStore};
use linkenchamba::config::AppConfig;
use linkenchamba::error::AppError;
use linkenchamba::manual::ManualLibrary;
use linkenchamba::notify::SmtpNotifier;
use linkenchamba::sealing::RsaFieldSealer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut config: AppConfig, mut args: ServeArgs) -> Result<(), AppError> {
    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    let scorer = Arc::new(infra::scorer(&config.scoring));
    let sealing = config.sealing.clone();
    let sealer = tokio::task::spawn_blocking(move || infra::sealer(&sealing))
        .await
        .map_err(|err| AppError::Io(std::io::Error::other(err)))??;
    let sealer = Arc::new(sealer);

    let notifier = SmtpNotifier::from_config(&config.notify)?;
    if !notifier.is_enabled() {
        warn!("EMAIL_USUARIO/EMAIL_PASSWORD not set; contact delivery is disabled");
    }
    let notifier = Arc::new(notifier);

    if args.in_memory {
        let repository = Arc::new(InMemoryCandidateRepository::default());
        let service = CandidateService::new(repository, sealer, notifier, scorer);
        serve(&config, service).await
    } else {
        let repository = Arc::new(JsonFileStore::open(&config.store.path, scorer.catalog())?);
        let service = CandidateService::new(repository, sealer, notifier, scorer);
        serve(&config, service).await
    }
}

async fn serve<R>(
    config: &AppConfig,
    service: CandidateService<R, RsaFieldSealer, SmtpNotifier>,
) -> Result<(), AppError>
where
    R: CandidateRepository + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let manual = Arc::new(ManualLibrary::default());
    let app = with_candidate_routes(Arc::new(service), manual)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, store = %config.store.path.display(), "candidate service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
