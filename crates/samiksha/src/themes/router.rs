use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::decoder::{HeaderSequence, RawThemeRow};
use super::domain::SolutionId;
use super::expressions::RubricExpressionRow;
use super::repository::{CriteriaRepository, SolutionRepository};
use super::service::{ThemeService, ThemeServiceError};
use super::weightage::CriteriaWeightRow;

/// Shared handler state: the service plus the rubric levels used when a request names none.
pub struct ThemeRouterState<S, C> {
    pub service: ThemeService<S, C>,
    pub default_levels: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeUploadRequest {
    pub header_sequence: Vec<String>,
    pub rows: Vec<RawThemeRow>,
}

#[derive(Debug, Deserialize)]
pub struct RubricExpressionRequest {
    #[serde(default)]
    pub levels: Option<Vec<String>>,
    pub rows: Vec<RubricExpressionRow>,
}

#[derive(Debug, Deserialize)]
pub struct CriteriaWeightageRequest {
    pub rows: Vec<CriteriaWeightRow>,
}

/// Router builder exposing the theme upload and rubric maintenance endpoints.
pub fn theme_router<S, C>(state: Arc<ThemeRouterState<S, C>>) -> Router
where
    S: SolutionRepository + 'static,
    C: CriteriaRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/solutions/:solution_id/themes",
            get(themes_handler::<S, C>).post(upload_handler::<S, C>),
        )
        .route(
            "/api/v1/solutions/:solution_id/themes/rubric",
            post(rubric_handler::<S, C>),
        )
        .route(
            "/api/v1/solutions/:solution_id/themes/criteria-weightage",
            post(weightage_handler::<S, C>),
        )
        .with_state(state)
}

pub(crate) async fn themes_handler<S, C>(
    State(state): State<Arc<ThemeRouterState<S, C>>>,
    Path(solution_id): Path<String>,
) -> Response
where
    S: SolutionRepository + 'static,
    C: CriteriaRepository + 'static,
{
    match state.service.themes(&SolutionId(solution_id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn upload_handler<S, C>(
    State(state): State<Arc<ThemeRouterState<S, C>>>,
    Path(solution_id): Path<String>,
    Json(request): Json<ThemeUploadRequest>,
) -> Response
where
    S: SolutionRepository + 'static,
    C: CriteriaRepository + 'static,
{
    let headers = match HeaderSequence::new(request.header_sequence) {
        Ok(headers) => headers,
        Err(error) => return error_response(error.into()),
    };

    match state
        .service
        .upload_themes(&SolutionId(solution_id), request.rows, &headers)
    {
        Ok(report) if report.committed => (StatusCode::OK, Json(report)).into_response(),
        Ok(report) => (StatusCode::UNPROCESSABLE_ENTITY, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn rubric_handler<S, C>(
    State(state): State<Arc<ThemeRouterState<S, C>>>,
    Path(solution_id): Path<String>,
    Json(request): Json<RubricExpressionRequest>,
) -> Response
where
    S: SolutionRepository + 'static,
    C: CriteriaRepository + 'static,
{
    let levels = request
        .levels
        .unwrap_or_else(|| state.default_levels.clone());

    match state
        .service
        .set_rubric_expressions(&SolutionId(solution_id), request.rows, &levels)
    {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn weightage_handler<S, C>(
    State(state): State<Arc<ThemeRouterState<S, C>>>,
    Path(solution_id): Path<String>,
    Json(request): Json<CriteriaWeightageRequest>,
) -> Response
where
    S: SolutionRepository + 'static,
    C: CriteriaRepository + 'static,
{
    match state
        .service
        .update_criteria_weightage(&SolutionId(solution_id), &request.rows)
    {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ThemeServiceError) -> Response {
    let status = error.status_code();
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}
