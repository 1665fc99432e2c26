use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use samiksha::themes::{theme_router, CriteriaRepository, SolutionRepository, ThemeRouterState};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_theme_routes<S, C>(state: Arc<ThemeRouterState<S, C>>) -> Router
where
    S: SolutionRepository + 'static,
    C: CriteriaRepository + 'static,
{
    theme_router(state)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{InMemoryCriteriaRepository, InMemorySolutionRepository};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use samiksha::themes::{CriteriaId, ThemeService};
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn app_state(ready: bool) -> AppState {
        let handle = PrometheusBuilder::new().build_recorder().handle();
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(handle),
        }
    }

    fn app(state: AppState) -> Router {
        let criteria: BTreeSet<CriteriaId> =
            ["C1", "C2"].into_iter().map(CriteriaId::from).collect();
        let service = ThemeService::new(
            Arc::new(InMemorySolutionRepository::default()),
            Arc::new(InMemoryCriteriaRepository::with_ids(criteria)),
        );
        let router_state = Arc::new(ThemeRouterState {
            service,
            default_levels: vec!["L1".to_string(), "L2".to_string()],
        });
        with_theme_routes(router_state).layer(Extension(state))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_tracks_flag() {
        let state = app_state(false);
        let response = app(state.clone())
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["status"], "initializing");

        state.readiness.store(true, Ordering::Release);
        let response = app(state)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn theme_routes_are_mounted_alongside_probes() {
        let payload = json!({
            "headerSequence": ["theme", "criteriaInternalId"],
            "rows": [
                { "theme": "Safety###SAF###30", "criteriaInternalId": "C1" },
                { "theme": "Safety###SAF###30", "criteriaInternalId": "C2" }
            ]
        });
        let request = Request::post("/api/v1/solutions/sol-9/themes")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request");

        let response = app(app_state(true)).oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app(app_state(true))
            .oneshot(
                Request::get("/api/v1/solutions/unknown/themes")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
