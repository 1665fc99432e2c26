//! Decoding of delimiter-encoded theme upload rows.
//!
//! Theme columns hold `name###externalId###weightage` triads and the criteria column holds
//! `criteriaId###weightage`. Decoding never stops at a bad row: failures are recorded on the
//! row's [`RowStatus`] and the batch is judged as a whole by the builder.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Serialize, Serializer};

use super::criteria::CriteriaLookup;
use super::domain::{CriteriaId, CriteriaWeight, ThemeType};
use super::error::ThemeError;

pub const FIELD_DELIMITER: &str = "###";

/// One upload row keyed by column name; absent cells are empty strings.
pub type RawThemeRow = BTreeMap<String, String>;

/// Ordered upload columns: theme columns from the root down, then the criteria column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSequence {
    columns: Vec<String>,
}

impl HeaderSequence {
    pub fn new<I, S>(columns: I) -> Result<Self, ThemeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns
            .into_iter()
            .map(|column| column.into().trim().to_string())
            .filter(|column| !column.is_empty())
            .collect();

        if columns.len() < 2 {
            return Err(ThemeError::InvalidHeaderSequence);
        }

        for (index, column) in columns.iter().enumerate() {
            if columns[..index].contains(column) {
                return Err(ThemeError::DuplicateHeader(column.clone()));
            }
        }

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn theme_columns(&self) -> &[String] {
        &self.columns[..self.columns.len() - 1]
    }

    pub fn criteria_column(&self) -> &str {
        &self.columns[self.columns.len() - 1]
    }

    pub fn root_column(&self) -> &str {
        &self.columns[0]
    }

    fn theme_type_for(&self, column: &str) -> ThemeType {
        if column == self.root_column() {
            ThemeType::Theme
        } else {
            ThemeType::Subtheme
        }
    }
}

/// Reason a single row could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowDecodeError {
    #[error("Missing name/externalId")]
    MissingNameOrExternalId { column: String },
    #[error("Criteria is not Present")]
    UnknownCriteria { criteria_id: String },
}

/// Validation state of one upload row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RowStatus {
    /// Decoded cleanly; promoted to `Success` only when the whole batch commits.
    #[default]
    Pending,
    Success,
    Failed(RowDecodeError),
}

impl RowStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, RowStatus::Failed(_))
    }

    fn record(&mut self, error: RowDecodeError) {
        if !self.is_failed() {
            *self = RowStatus::Failed(error);
        }
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowStatus::Pending => Ok(()),
            RowStatus::Success => f.write_str("success"),
            RowStatus::Failed(error) => write!(f, "{error}"),
        }
    }
}

impl Serialize for RowStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Decoded theme or subtheme cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeCell {
    pub name: String,
    pub external_id: String,
    pub weightage: f64,
}

/// Structured result of decoding one upload row.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedThemeRow {
    pub cells: BTreeMap<String, ThemeCell>,
    pub criteria: Option<CriteriaWeight>,
    pub status: RowStatus,
}

/// Node attributes registered while decoding, keyed by node name.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeMeta {
    pub name: String,
    pub label: String,
    pub theme_type: ThemeType,
    pub external_id: String,
    pub weightage: f64,
}

/// Accumulator threaded through a decode pass. Later rows overwrite earlier entries of the
/// same name.
#[derive(Debug, Clone, Default)]
pub struct ThemeMetadata {
    entries: HashMap<String, ThemeMeta>,
}

impl ThemeMetadata {
    pub fn get(&self, name: &str) -> Option<&ThemeMeta> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn register(&mut self, meta: ThemeMeta) {
        self.entries.insert(meta.name.clone(), meta);
    }
}

/// Decoded rows plus the metadata gathered while reading them.
#[derive(Debug, Clone)]
pub struct DecodedBatch {
    pub rows: Vec<DecodedThemeRow>,
    pub metadata: ThemeMetadata,
}

pub struct ThemeRowDecoder<'a, C: ?Sized> {
    headers: &'a HeaderSequence,
    criteria: &'a C,
}

impl<'a, C> ThemeRowDecoder<'a, C>
where
    C: CriteriaLookup + ?Sized,
{
    pub fn new(headers: &'a HeaderSequence, criteria: &'a C) -> Self {
        Self { headers, criteria }
    }

    pub fn decode_all(&self, rows: &[RawThemeRow]) -> DecodedBatch {
        let mut metadata = ThemeMetadata::default();
        let rows = rows
            .iter()
            .map(|row| self.decode(row, &mut metadata))
            .collect();
        DecodedBatch { rows, metadata }
    }

    pub fn decode(&self, row: &RawThemeRow, metadata: &mut ThemeMetadata) -> DecodedThemeRow {
        let mut decoded = DecodedThemeRow {
            cells: BTreeMap::new(),
            criteria: None,
            status: RowStatus::Pending,
        };

        for column in self.headers.theme_columns() {
            let Some(value) = non_empty_cell(row, column) else {
                continue;
            };

            let parts = split_cell(value);
            let name = parts.first().copied().unwrap_or_default();
            let external_id = parts.get(1).copied().unwrap_or_default();
            if parts.len() < 2 || name.is_empty() || external_id.is_empty() {
                decoded
                    .status
                    .record(RowDecodeError::MissingNameOrExternalId {
                        column: column.clone(),
                    });
                continue;
            }

            let weightage = parse_int_prefix(parts.get(2).copied().unwrap_or_default());
            metadata.register(ThemeMeta {
                name: name.to_string(),
                label: column.clone(),
                theme_type: self.headers.theme_type_for(column),
                external_id: external_id.to_string(),
                weightage,
            });
            decoded.cells.insert(
                column.clone(),
                ThemeCell {
                    name: name.to_string(),
                    external_id: external_id.to_string(),
                    weightage,
                },
            );
        }

        if let Some(value) = non_empty_cell(row, self.headers.criteria_column()) {
            let parts = split_cell(value);
            let criteria_id = parts.first().copied().unwrap_or_default();
            if self.criteria.contains(criteria_id) {
                decoded.criteria = Some(CriteriaWeight {
                    criteria_id: CriteriaId(criteria_id.to_string()),
                    weightage: parse_int_prefix(parts.get(1).copied().unwrap_or_default()),
                });
            } else {
                decoded.status.record(RowDecodeError::UnknownCriteria {
                    criteria_id: criteria_id.to_string(),
                });
            }
        }

        decoded
    }
}

fn non_empty_cell<'r>(row: &'r RawThemeRow, column: &str) -> Option<&'r str> {
    row.get(column)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn split_cell(value: &str) -> Vec<&str> {
    value.split(FIELD_DELIMITER).map(str::trim).collect()
}

/// Leading-integer parse: `"50"` and `"50.7"` give 50, anything without digits gives 0.
pub(crate) fn parse_int_prefix(raw: &str) -> f64 {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    digits[..end]
        .parse::<i64>()
        .map(|value| sign * value as f64)
        .unwrap_or(0.0)
}
