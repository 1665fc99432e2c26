use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{required_weightage, round_weightage, CriteriaId, FlatTheme, ThemeNode};
use super::error::ThemeError;
use super::flatten::flatten;

/// Requested weightage for one criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaWeightRow {
    pub criteria_id: CriteriaId,
    #[serde(deserialize_with = "required_weightage")]
    pub weightage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightageUpdate {
    pub themes: Vec<ThemeNode>,
    pub flattened: Vec<FlatTheme>,
    /// Number of criteria entries rewritten; equals the requested row count.
    pub updated: usize,
}

/// Rewrite the weightage of every criteria entry named in `rows`.
///
/// Works on a copy of `themes`: the updated tree is only returned when the number of rewritten
/// entries equals the number of rows, otherwise [`ThemeError::WeightageMismatch`] is returned
/// and the caller's tree stays as it was.
pub fn update_criteria_weightage(
    themes: &[ThemeNode],
    rows: &[CriteriaWeightRow],
) -> Result<WeightageUpdate, ThemeError> {
    let mut working = themes.to_vec();
    let mut updated = 0;
    for theme in working.iter_mut() {
        update_node(theme, rows, &mut updated);
    }

    if updated != rows.len() {
        warn!(
            requested = rows.len(),
            updated, "criteria weightage update discarded"
        );
        return Err(ThemeError::WeightageMismatch {
            requested: rows.len(),
            updated,
        });
    }

    debug!(updated, "criteria weightage updated");
    let flattened = flatten(&working);
    Ok(WeightageUpdate {
        themes: working,
        flattened,
        updated,
    })
}

fn update_node(node: &mut ThemeNode, rows: &[CriteriaWeightRow], updated: &mut usize) {
    for entry in node.criteria.iter_mut() {
        if let Some(row) = rows.iter().find(|row| row.criteria_id == entry.criteria_id) {
            entry.weightage = round_weightage(row.weightage);
            *updated += 1;
        }
    }

    for child in node.children.iter_mut() {
        update_node(child, rows, updated);
    }
}
