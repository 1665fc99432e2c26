use tracing::{debug, warn};

use super::criteria::CriteriaLookup;
use super::decoder::{
    DecodedBatch, DecodedThemeRow, HeaderSequence, RawThemeRow, RowStatus, ThemeMetadata,
    ThemeRowDecoder,
};
use super::domain::{CriteriaWeight, ThemeNode};
use super::error::ThemeError;

/// Committed theme forest together with the status of every source row.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeTreeBuild {
    pub themes: Vec<ThemeNode>,
    pub statuses: Vec<RowStatus>,
}

/// Decode `rows` and fold them into one tree per top-level theme.
///
/// The batch is all-or-nothing: a single failed row yields [`ThemeError::RowsRejected`]
/// carrying every row's status, and no tree.
pub fn build_theme_tree<C>(
    rows: &[RawThemeRow],
    headers: &HeaderSequence,
    criteria: &C,
) -> Result<ThemeTreeBuild, ThemeError>
where
    C: CriteriaLookup + ?Sized,
{
    let DecodedBatch {
        rows: decoded,
        metadata,
    } = ThemeRowDecoder::new(headers, criteria).decode_all(rows);

    let total = decoded.len();
    let rejected = decoded.iter().filter(|row| row.status.is_failed()).count();
    if rejected > 0 {
        warn!(rejected, total, "theme upload rejected");
        return Err(ThemeError::RowsRejected {
            rejected,
            total,
            statuses: decoded.into_iter().map(|row| row.status).collect(),
        });
    }

    let mut root = PathNode::default();
    for (index, row) in decoded.iter().enumerate() {
        if !insert_row(&mut root, row, headers) {
            warn!(row = index, "row names no theme; its criteria are dropped");
        }
    }

    let themes = materialize(root.children, &metadata);
    debug!(
        rows = total,
        themes = themes.len(),
        nodes = metadata.len(),
        "theme tree built"
    );

    Ok(ThemeTreeBuild {
        themes,
        statuses: vec![RowStatus::Success; total],
    })
}

/// Intermediate tree keyed by node name, in first-seen order.
#[derive(Debug, Default)]
struct PathNode<'r> {
    children: Vec<(&'r str, PathNode<'r>)>,
    criteria: Option<Vec<CriteriaWeight>>,
}

impl<'r> PathNode<'r> {
    fn child(&mut self, name: &'r str) -> &mut PathNode<'r> {
        let index = match self.children.iter().position(|(key, _)| *key == name) {
            Some(index) => index,
            None => {
                self.children.push((name, PathNode::default()));
                self.children.len() - 1
            }
        };
        &mut self.children[index].1
    }
}

/// Walk the header columns, descending one level per populated theme cell, and drop the row's
/// criteria into the bag of the node where the walk ends. Returns false when the row had no
/// theme cell at all.
fn insert_row<'r>(
    root: &mut PathNode<'r>,
    row: &'r DecodedThemeRow,
    headers: &HeaderSequence,
) -> bool {
    let mut cursor = root;
    let mut depth = 0;
    for column in headers.theme_columns() {
        if let Some(cell) = row.cells.get(column) {
            cursor = cursor.child(&cell.name);
            depth += 1;
        }
    }

    if depth == 0 {
        return false;
    }

    let bag = cursor.criteria.get_or_insert_with(Vec::new);
    if let Some(criteria) = &row.criteria {
        bag.push(criteria.clone());
    }
    true
}

fn materialize(children: Vec<(&str, PathNode<'_>)>, metadata: &ThemeMetadata) -> Vec<ThemeNode> {
    children
        .into_iter()
        .filter_map(|(name, node)| {
            let Some(meta) = metadata.get(name) else {
                warn!(theme = name, "no metadata registered for theme node");
                return None;
            };

            Some(ThemeNode {
                name: meta.name.clone(),
                label: meta.label.clone(),
                theme_type: meta.theme_type,
                external_id: meta.external_id.clone(),
                weightage: meta.weightage,
                children: materialize(node.children, metadata),
                criteria: node.criteria.unwrap_or_default(),
                rubric: None,
            })
        })
        .collect()
}
