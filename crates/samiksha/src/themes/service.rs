use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::builder::{build_theme_tree, ThemeTreeBuild};
use super::decoder::{HeaderSequence, RawThemeRow, RowStatus};
use super::domain::{FlatTheme, SolutionId};
use super::error::ThemeError;
use super::expressions::{assign_rubric_expressions, RubricExpressionRow};
use super::flatten::flatten;
use super::repository::{CriteriaRepository, RepositoryError, SolutionRepository, SolutionThemes};
use super::weightage::{update_criteria_weightage, CriteriaWeightRow};

/// Source row echoed back with its validation status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeRowReport {
    #[serde(flatten)]
    pub row: RawThemeRow,
    pub status: RowStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeUploadReport {
    pub committed: bool,
    pub rows: Vec<ThemeRowReport>,
}

impl ThemeUploadReport {
    fn new(committed: bool, rows: Vec<RawThemeRow>, statuses: Vec<RowStatus>) -> Self {
        let rows = rows
            .into_iter()
            .zip(statuses)
            .map(|(row, status)| ThemeRowReport { row, status })
            .collect();
        Self { committed, rows }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RubricUpdateReport {
    pub matched_rows: usize,
    pub rows: Vec<RubricExpressionRow>,
    pub flattened_themes: Vec<FlatTheme>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightageUpdateReport {
    pub updated: usize,
    pub flattened_themes: Vec<FlatTheme>,
}

/// Service composing the theme engine with the solution and criteria stores.
pub struct ThemeService<S, C> {
    solutions: Arc<S>,
    criteria: Arc<C>,
}

impl<S, C> ThemeService<S, C>
where
    S: SolutionRepository + 'static,
    C: CriteriaRepository + 'static,
{
    pub fn new(solutions: Arc<S>, criteria: Arc<C>) -> Self {
        Self {
            solutions,
            criteria,
        }
    }

    /// Build and store a theme tree from upload rows. A rejected batch stores nothing and
    /// reports every row's status with `committed = false`.
    pub fn upload_themes(
        &self,
        solution_id: &SolutionId,
        rows: Vec<RawThemeRow>,
        headers: &HeaderSequence,
    ) -> Result<ThemeUploadReport, ThemeServiceError> {
        let known = self.criteria.criteria_ids()?;

        match build_theme_tree(&rows, headers, &known) {
            Ok(ThemeTreeBuild { themes, statuses }) => {
                let flattened_themes = flatten(&themes);
                self.solutions.save_themes(SolutionThemes {
                    solution_id: solution_id.clone(),
                    themes,
                    flattened_themes,
                    updated_at: Utc::now(),
                })?;
                info!(solution = %solution_id.0, rows = rows.len(), "theme tree committed");
                Ok(ThemeUploadReport::new(true, rows, statuses))
            }
            Err(ThemeError::RowsRejected {
                rejected, statuses, ..
            }) => {
                warn!(solution = %solution_id.0, rejected, "theme upload not committed");
                Ok(ThemeUploadReport::new(false, rows, statuses))
            }
            Err(other) => Err(other.into()),
        }
    }

    pub fn set_rubric_expressions(
        &self,
        solution_id: &SolutionId,
        mut rows: Vec<RubricExpressionRow>,
        levels: &[String],
    ) -> Result<RubricUpdateReport, ThemeServiceError> {
        let mut record = self.themes(solution_id)?;

        let assignment = assign_rubric_expressions(&mut record.themes, &mut rows, levels);
        record.flattened_themes = assignment.flattened.clone();
        record.updated_at = Utc::now();
        self.solutions.save_themes(record)?;

        info!(
            solution = %solution_id.0,
            matched = assignment.matched_rows,
            total = rows.len(),
            "rubric expressions stored"
        );
        Ok(RubricUpdateReport {
            matched_rows: assignment.matched_rows,
            rows,
            flattened_themes: assignment.flattened,
        })
    }

    /// Rewrite criteria weightage; nothing is stored unless every row matched.
    pub fn update_criteria_weightage(
        &self,
        solution_id: &SolutionId,
        rows: &[CriteriaWeightRow],
    ) -> Result<WeightageUpdateReport, ThemeServiceError> {
        let record = self.themes(solution_id)?;
        let update = update_criteria_weightage(&record.themes, rows)?;

        self.solutions.save_themes(SolutionThemes {
            solution_id: record.solution_id,
            themes: update.themes,
            flattened_themes: update.flattened.clone(),
            updated_at: Utc::now(),
        })?;

        info!(solution = %solution_id.0, updated = update.updated, "criteria weightage stored");
        Ok(WeightageUpdateReport {
            updated: update.updated,
            flattened_themes: update.flattened,
        })
    }

    pub fn themes(&self, solution_id: &SolutionId) -> Result<SolutionThemes, ThemeServiceError> {
        let record = self
            .solutions
            .fetch_themes(solution_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }
}

/// Error raised by the theme service.
#[derive(Debug, thiserror::Error)]
pub enum ThemeServiceError {
    #[error(transparent)]
    Themes(#[from] ThemeError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ThemeServiceError {
    /// HTTP status for this failure: rejected data is 422, a missing solution 404 and an
    /// unreachable store 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ThemeServiceError::Themes(ThemeError::WeightageMismatch { .. })
            | ThemeServiceError::Themes(ThemeError::RowsRejected { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ThemeServiceError::Themes(_) => StatusCode::BAD_REQUEST,
            ThemeServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            ThemeServiceError::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
