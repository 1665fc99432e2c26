use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for assessment criteria.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CriteriaId(pub String);

impl CriteriaId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CriteriaId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CriteriaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CriteriaId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Identifier wrapper for the solution document that owns a theme tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SolutionId(pub String);

/// Position of a node in the rubric: top-level themes or nested subthemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeType {
    Theme,
    Subtheme,
}

/// Criteria reference carried by a node together with its contribution weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaWeight {
    pub criteria_id: CriteriaId,
    #[serde(default)]
    pub weightage: f64,
}

/// Scoring expressions attached to a node, one per rating level.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rubric {
    pub expression_variables: BTreeMap<String, String>,
    pub levels: BTreeMap<String, RubricLevel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricLevel {
    pub expression: String,
}

/// One theme or subtheme in the nested scoring tree.
///
/// Internal nodes carry `children`; leaves carry `criteria`. A node that closes one upload
/// path while also prefixing deeper paths keeps both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeNode {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub theme_type: ThemeType,
    pub external_id: String,
    #[serde(default)]
    pub weightage: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ThemeNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub criteria: Vec<CriteriaWeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rubric: Option<Rubric>,
}

impl ThemeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn hierarchy_entry(&self) -> HierarchyEntry {
        HierarchyEntry {
            theme_type: self.theme_type,
            label: self.label.clone(),
            external_id: self.external_id.clone(),
            name: self.name.clone(),
        }
    }

    pub fn summary(&self) -> ThemeSummary {
        ThemeSummary {
            name: self.name.clone(),
            label: self.label.clone(),
            theme_type: self.theme_type,
            external_id: self.external_id.clone(),
            weightage: self.weightage,
            immediate_children: self.children.iter().map(ThemeNode::summary).collect(),
        }
    }

    /// Depth-first lookup by external id.
    pub fn find(&self, external_id: &str) -> Option<&ThemeNode> {
        if self.external_id == external_id {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find(external_id))
    }
}

/// Ancestor identity tuple recorded in a flattened node's track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyEntry {
    #[serde(rename = "type")]
    pub theme_type: ThemeType,
    pub label: String,
    pub external_id: String,
    pub name: String,
}

/// Direct child of an internal node, stripped of its subtree, rubric and criteria. An internal
/// child keeps the summaries of its own children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSummary {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub theme_type: ThemeType,
    pub external_id: String,
    pub weightage: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub immediate_children: Vec<ThemeSummary>,
}

/// Flattened, hierarchy-annotated projection of a single node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatTheme {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub theme_type: ThemeType,
    pub external_id: String,
    pub weightage: f64,
    pub criteria: Vec<CriteriaWeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rubric: Option<Rubric>,
    pub hierarchy_level: usize,
    pub hierarchy_track: Vec<HierarchyEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub immediate_children: Vec<ThemeSummary>,
}

impl FlatTheme {
    pub fn is_internal(&self) -> bool {
        !self.immediate_children.is_empty()
    }
}

pub(crate) fn round_weightage(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parse a free-form weightage, accepting numbers and numeric strings.
pub(crate) fn parse_weightage_text(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawWeightage {
    Number(f64),
    Text(String),
}

impl RawWeightage {
    fn value(self) -> Option<f64> {
        match self {
            RawWeightage::Number(value) => Some(value),
            RawWeightage::Text(text) => parse_weightage_text(&text),
        }
    }
}

pub(crate) fn optional_weightage<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<RawWeightage>::deserialize(deserializer)?;
    Ok(raw.and_then(RawWeightage::value))
}

pub(crate) fn required_weightage<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    RawWeightage::deserialize(deserializer)?
        .value()
        .ok_or_else(|| serde::de::Error::custom("weightage must be a number"))
}
