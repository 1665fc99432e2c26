use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{CriteriaId, FlatTheme, SolutionId, ThemeNode};

/// Theme slice of a solution document: the nested tree and its flattened projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionThemes {
    pub solution_id: SolutionId,
    pub themes: Vec<ThemeNode>,
    pub flattened_themes: Vec<FlatTheme>,
    pub updated_at: DateTime<Utc>,
}

/// Document store holding solution theme trees.
///
/// `save_themes` overwrites the whole slice. Callers must not run two tree mutations for the
/// same solution concurrently; the store offers no ordering between them.
pub trait SolutionRepository: Send + Sync {
    fn fetch_themes(&self, id: &SolutionId) -> Result<Option<SolutionThemes>, RepositoryError>;
    fn save_themes(&self, record: SolutionThemes) -> Result<(), RepositoryError>;
}

/// Source of the criteria ids a theme upload may reference.
pub trait CriteriaRepository: Send + Sync {
    fn criteria_ids(&self) -> Result<BTreeSet<CriteriaId>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
