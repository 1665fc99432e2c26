use crate::cli::ServeArgs;
use crate::infra::{load_criteria_seed, AppState, InMemorySolutionRepository};
use crate::routes::with_theme_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use samiksha::config::AppConfig;
use samiksha::error::AppError;
use samiksha::telemetry;
use samiksha::themes::{CriteriaRepository, ThemeRouterState, ThemeService, ThemeServiceError};
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

    let criteria = load_criteria_seed(config.rubric.criteria_seed.as_deref())?;
    let known_criteria = known_criteria(&criteria)?;
    let service = ThemeService::new(
        Arc::new(InMemorySolutionRepository::default()),
        Arc::new(criteria),
    );
    let router_state = Arc::new(ThemeRouterState {
        service,
        default_levels: config.rubric.levels.clone(),
    });

    let app = with_theme_routes(router_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        known_criteria,
        levels = ?config.rubric.levels,
        "rubric engine ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

fn known_criteria<C: CriteriaRepository>(criteria: &C) -> Result<usize, AppError> {
    let ids = criteria.criteria_ids().map_err(ThemeServiceError::from)?;
    Ok(ids.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::InMemoryCriteriaRepository;
    use samiksha::themes::{CriteriaId, RepositoryError};
    use std::collections::BTreeSet;

    struct OfflineCriteria;

    impl CriteriaRepository for OfflineCriteria {
        fn criteria_ids(&self) -> Result<BTreeSet<CriteriaId>, RepositoryError> {
            Err(RepositoryError::Unavailable("criteria store offline".to_string()))
        }
    }

    #[test]
    fn known_criteria_counts_seeded_ids() {
        let ids = ["C1", "C2", "C3"].into_iter().map(CriteriaId::from).collect();
        let repository = InMemoryCriteriaRepository::with_ids(ids);
        assert_eq!(known_criteria(&repository).expect("count"), 3);
    }

    #[test]
    fn unavailable_criteria_store_fails_startup() {
        let error = known_criteria(&OfflineCriteria).expect_err("store offline");
        assert!(matches!(
            error,
            AppError::Themes(ThemeServiceError::Repository(RepositoryError::Unavailable(_)))
        ));
    }
}
