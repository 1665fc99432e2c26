use super::domain::{CriteriaWeight, FlatTheme, HierarchyEntry, ThemeNode};

/// Flatten a theme forest into a post-order list annotated with hierarchy metadata.
///
/// Internal nodes carry the concatenated criteria of their subtree and a summary of their
/// direct children. The input tree is left untouched.
pub fn flatten(themes: &[ThemeNode]) -> Vec<FlatTheme> {
    let mut flat = Vec::new();
    let mut track = Vec::new();
    for theme in themes {
        flatten_node(theme, 0, &mut track, &mut flat);
    }
    flat
}

fn flatten_node(
    node: &ThemeNode,
    level: usize,
    track: &mut Vec<HierarchyEntry>,
    flat: &mut Vec<FlatTheme>,
) -> Vec<CriteriaWeight> {
    let hierarchy_track = track.clone();
    let mut criteria: Vec<CriteriaWeight> = node.criteria.clone();

    if !node.is_leaf() {
        track.push(node.hierarchy_entry());
        for child in &node.children {
            criteria.extend(flatten_node(child, level + 1, track, flat));
        }
        track.pop();
    }

    flat.push(FlatTheme {
        name: node.name.clone(),
        label: node.label.clone(),
        theme_type: node.theme_type,
        external_id: node.external_id.clone(),
        weightage: node.weightage,
        criteria: criteria.clone(),
        rubric: node.rubric.clone(),
        hierarchy_level: level,
        hierarchy_track,
        immediate_children: node.children.iter().map(ThemeNode::summary).collect(),
    });

    criteria
}
