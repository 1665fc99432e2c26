use metrics_exporter_prometheus::PrometheusHandle;
use samiksha::error::AppError;
use samiksha::themes::{
    read_criteria_ids, CriteriaId, CriteriaRepository, RepositoryError, SolutionId,
    SolutionRepository, SolutionThemes,
};
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, RwLock};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySolutionRepository {
    records: Arc<Mutex<HashMap<SolutionId, SolutionThemes>>>,
}

impl SolutionRepository for InMemorySolutionRepository {
    fn fetch_themes(&self, id: &SolutionId) -> Result<Option<SolutionThemes>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard.get(id).cloned())
    }

    fn save_themes(&self, record: SolutionThemes) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        guard.insert(record.solution_id.clone(), record);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCriteriaRepository {
    ids: Arc<RwLock<BTreeSet<CriteriaId>>>,
}

impl InMemoryCriteriaRepository {
    pub(crate) fn with_ids(ids: BTreeSet<CriteriaId>) -> Self {
        Self {
            ids: Arc::new(RwLock::new(ids)),
        }
    }
}

impl CriteriaRepository for InMemoryCriteriaRepository {
    fn criteria_ids(&self) -> Result<BTreeSet<CriteriaId>, RepositoryError> {
        let guard = self.ids.read().map_err(poisoned)?;
        Ok(guard.clone())
    }
}

/// Loads the criteria store from the optional seed CSV; no seed means an empty store.
pub(crate) fn load_criteria_seed(
    seed: Option<&Path>,
) -> Result<InMemoryCriteriaRepository, AppError> {
    let Some(path) = seed else {
        return Ok(InMemoryCriteriaRepository::default());
    };
    let ids = read_criteria_ids(File::open(path)?)?;
    Ok(InMemoryCriteriaRepository::with_ids(ids))
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> RepositoryError {
    RepositoryError::Unavailable("in-memory store lock poisoned".to_string())
}
