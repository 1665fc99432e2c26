use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{optional_weightage, round_weightage, FlatTheme, Rubric, RubricLevel, ThemeNode};
use super::flatten::flatten;

pub const SCORE_VARIABLE: &str = "SCORE";

/// Outcome recorded on each expression row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExpressionRowStatus {
    #[default]
    #[serde(rename = "Theme/Subtheme not updated")]
    NotUpdated,
    #[serde(rename = "Success")]
    Success,
}

/// One row of a rubric expression upload. Every column besides the identity, weightage and
/// status columns is a level expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RubricExpressionRow {
    pub external_id: String,
    pub name: String,
    #[serde(default)]
    pub status: ExpressionRowStatus,
    #[serde(
        default,
        deserialize_with = "optional_weightage",
        skip_serializing_if = "Option::is_none"
    )]
    pub weightage: Option<f64>,
    #[serde(flatten)]
    pub levels: BTreeMap<String, String>,
}

impl RubricExpressionRow {
    fn matches(&self, external_id: &str, name: &str) -> bool {
        self.external_id == external_id && self.name == name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionAssignment {
    pub matched_rows: usize,
    pub flattened: Vec<FlatTheme>,
}

/// Attach rubric expressions and weightage to every node named by `rows`.
///
/// Rows start as [`ExpressionRowStatus::NotUpdated`] and flip to `Success` once they match a
/// node, so callers can report the unmatched ones. Nodes without a matching row keep their
/// existing rubric.
pub fn assign_rubric_expressions(
    themes: &mut [ThemeNode],
    rows: &mut [RubricExpressionRow],
    levels: &[String],
) -> ExpressionAssignment {
    for row in rows.iter_mut() {
        row.status = ExpressionRowStatus::NotUpdated;
    }

    for theme in themes.iter_mut() {
        assign_node(theme, rows, levels);
    }

    let matched_rows = rows
        .iter()
        .filter(|row| row.status == ExpressionRowStatus::Success)
        .count();
    debug!(matched_rows, total = rows.len(), "rubric expressions assigned");

    ExpressionAssignment {
        matched_rows,
        flattened: flatten(themes),
    }
}

fn assign_node(node: &mut ThemeNode, rows: &mut [RubricExpressionRow], levels: &[String]) {
    let matched = rows
        .iter_mut()
        .find(|row| row.matches(&node.external_id, &node.name));
    if let Some(row) = matched {
        node.rubric = Some(rubric_for(&node.external_id, row, levels));
        node.weightage = row.weightage.map(round_weightage).unwrap_or(0.0);
        row.status = ExpressionRowStatus::Success;
    }

    for child in node.children.iter_mut() {
        assign_node(child, rows, levels);
    }
}

fn rubric_for(external_id: &str, row: &RubricExpressionRow, levels: &[String]) -> Rubric {
    let mut rubric = Rubric::default();
    rubric.expression_variables.insert(
        SCORE_VARIABLE.to_string(),
        format!("{external_id}.sumOfPointsOfAllChildren()"),
    );

    for level in levels {
        match row.levels.get(level) {
            Some(expression) => {
                rubric.levels.insert(
                    level.clone(),
                    RubricLevel {
                        expression: format!("({expression})"),
                    },
                );
            }
            None => warn!(
                external_id,
                rubric_level = %level,
                "expression row has no value for level"
            ),
        }
    }

    rubric
}
