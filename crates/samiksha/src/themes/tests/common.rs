use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::themes::decoder::{HeaderSequence, RawThemeRow};
use crate::themes::domain::{CriteriaId, SolutionId, ThemeNode};
use crate::themes::expressions::{ExpressionRowStatus, RubricExpressionRow};
use crate::themes::repository::{
    CriteriaRepository, RepositoryError, SolutionRepository, SolutionThemes,
};
use crate::themes::router::{theme_router, ThemeRouterState};
use crate::themes::service::ThemeService;
use crate::themes::weightage::CriteriaWeightRow;
use crate::themes::{build_theme_tree, ThemeTreeBuild};

pub(super) fn raw_row(cells: &[(&str, &str)]) -> RawThemeRow {
    cells
        .iter()
        .map(|(column, value)| (column.to_string(), value.to_string()))
        .collect()
}

pub(super) fn headers(columns: &[&str]) -> HeaderSequence {
    HeaderSequence::new(columns.iter().copied()).expect("valid header sequence")
}

pub(super) fn known_criteria(ids: &[&str]) -> BTreeSet<CriteriaId> {
    ids.iter().copied().map(CriteriaId::from).collect()
}

pub(super) fn three_level_headers() -> HeaderSequence {
    headers(&["theme", "subtheme", "criteriaInternalId"])
}

/// Safety → {Fire: C1, C2; Water: C3} and a Learning leaf holding C4.
pub(super) fn sample_rows() -> Vec<RawThemeRow> {
    vec![
        raw_row(&[
            ("theme", "Safety###S1###50"),
            ("subtheme", "Fire###S1a###20"),
            ("criteriaInternalId", "C1###10"),
        ]),
        raw_row(&[
            ("theme", "Safety###S1###50"),
            ("subtheme", "Fire###S1a###20"),
            ("criteriaInternalId", "C2###20"),
        ]),
        raw_row(&[
            ("theme", "Safety###S1###50"),
            ("subtheme", "Water###S1b###30"),
            ("criteriaInternalId", "C3###5"),
        ]),
        raw_row(&[
            ("theme", "Learning###L1###50"),
            ("subtheme", ""),
            ("criteriaInternalId", "C4###40"),
        ]),
    ]
}

pub(super) fn sample_criteria() -> BTreeSet<CriteriaId> {
    known_criteria(&["C1", "C2", "C3", "C4"])
}

pub(super) fn sample_tree() -> Vec<ThemeNode> {
    let ThemeTreeBuild { themes, .. } =
        build_theme_tree(&sample_rows(), &three_level_headers(), &sample_criteria())
            .expect("sample rows build");
    themes
}

pub(super) fn expression_row(
    external_id: &str,
    name: &str,
    weightage: Option<f64>,
    levels: &[(&str, &str)],
) -> RubricExpressionRow {
    RubricExpressionRow {
        external_id: external_id.to_string(),
        name: name.to_string(),
        status: ExpressionRowStatus::NotUpdated,
        weightage,
        levels: levels
            .iter()
            .map(|(level, expression)| (level.to_string(), expression.to_string()))
            .collect::<BTreeMap<_, _>>(),
    }
}

pub(super) fn weight_row(criteria_id: &str, weightage: f64) -> CriteriaWeightRow {
    CriteriaWeightRow {
        criteria_id: CriteriaId::from(criteria_id),
        weightage,
    }
}

pub(super) fn levels() -> Vec<String> {
    vec!["L1".to_string(), "L2".to_string()]
}

#[derive(Default, Clone)]
pub(super) struct MemorySolutions {
    records: Arc<Mutex<HashMap<SolutionId, SolutionThemes>>>,
}

impl MemorySolutions {
    pub(super) fn stored(&self, id: &str) -> Option<SolutionThemes> {
        self.records
            .lock()
            .expect("solutions mutex poisoned")
            .get(&SolutionId(id.to_string()))
            .cloned()
    }
}

impl SolutionRepository for MemorySolutions {
    fn fetch_themes(&self, id: &SolutionId) -> Result<Option<SolutionThemes>, RepositoryError> {
        let guard = self.records.lock().expect("solutions mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn save_themes(&self, record: SolutionThemes) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("solutions mutex poisoned");
        guard.insert(record.solution_id.clone(), record);
        Ok(())
    }
}

pub(super) struct MemoryCriteria(pub(super) BTreeSet<CriteriaId>);

impl CriteriaRepository for MemoryCriteria {
    fn criteria_ids(&self) -> Result<BTreeSet<CriteriaId>, RepositoryError> {
        Ok(self.0.clone())
    }
}

pub(super) struct UnavailableCriteria;

impl CriteriaRepository for UnavailableCriteria {
    fn criteria_ids(&self) -> Result<BTreeSet<CriteriaId>, RepositoryError> {
        Err(RepositoryError::Unavailable("criteria store offline".to_string()))
    }
}

pub(super) fn build_service() -> (ThemeService<MemorySolutions, MemoryCriteria>, MemorySolutions) {
    let solutions = MemorySolutions::default();
    let service = ThemeService::new(
        Arc::new(solutions.clone()),
        Arc::new(MemoryCriteria(sample_criteria())),
    );
    (service, solutions)
}

pub(super) fn router_with_service(
    service: ThemeService<MemorySolutions, MemoryCriteria>,
) -> axum::Router {
    theme_router(Arc::new(ThemeRouterState {
        service,
        default_levels: levels(),
    }))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
