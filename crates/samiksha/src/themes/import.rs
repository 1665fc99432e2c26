//! CSV readers for the three theme uploads and the criteria id listing.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

use serde::Deserialize;

use super::decoder::RawThemeRow;
use super::domain::{parse_weightage_text, CriteriaId};
use super::expressions::{ExpressionRowStatus, RubricExpressionRow};
use super::weightage::CriteriaWeightRow;

/// Theme upload as read from CSV: header order plus one raw row per record.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeCsv {
    pub headers: Vec<String>,
    pub rows: Vec<RawThemeRow>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("required column '{0}' is missing")]
    MissingColumn(&'static str),
    #[error("row {row}: weightage '{value}' is not a number")]
    InvalidWeightage { row: usize, value: String },
}

fn reader<R: Read>(source: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source)
}

pub fn read_theme_rows<R: Read>(source: R) -> Result<ThemeCsv, ImportError> {
    let mut csv_reader = reader(source);
    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|header| strip_bom(header).to_string())
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let row: RawThemeRow = headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                (
                    header.clone(),
                    record.get(index).unwrap_or_default().to_string(),
                )
            })
            .collect();
        rows.push(row);
    }

    Ok(ThemeCsv { headers, rows })
}

const EXTERNAL_ID: &str = "externalId";
const NAME: &str = "name";
const WEIGHTAGE: &str = "weightage";
const STATUS: &str = "status";

pub fn read_expression_rows<R: Read>(source: R) -> Result<Vec<RubricExpressionRow>, ImportError> {
    let mut csv_reader = reader(source);
    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|header| strip_bom(header).to_string())
        .collect();

    for required in [EXTERNAL_ID, NAME] {
        if !headers.iter().any(|header| header == required) {
            return Err(ImportError::MissingColumn(required));
        }
    }

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let mut external_id = String::new();
        let mut name = String::new();
        let mut weightage = None;
        let mut levels = BTreeMap::new();

        for (header, value) in headers.iter().zip(record.iter()) {
            match header.as_str() {
                EXTERNAL_ID => external_id = value.to_string(),
                NAME => name = value.to_string(),
                WEIGHTAGE => weightage = parse_weightage_text(value),
                STATUS => {}
                _ => {
                    levels.insert(header.clone(), value.to_string());
                }
            }
        }

        rows.push(RubricExpressionRow {
            external_id,
            name,
            status: ExpressionRowStatus::NotUpdated,
            weightage,
            levels,
        });
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct WeightRecord {
    #[serde(rename = "criteriaId")]
    criteria_id: String,
    #[serde(default)]
    weightage: String,
}

pub fn read_weight_rows<R: Read>(source: R) -> Result<Vec<CriteriaWeightRow>, ImportError> {
    let mut csv_reader = reader(source);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<WeightRecord>().enumerate() {
        let record = record?;
        let weightage = parse_weightage_text(&record.weightage).ok_or_else(|| {
            ImportError::InvalidWeightage {
                row: index + 1,
                value: record.weightage.clone(),
            }
        })?;
        rows.push(CriteriaWeightRow {
            criteria_id: CriteriaId(record.criteria_id),
            weightage,
        });
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct CriteriaRecord {
    #[serde(rename = "criteriaId")]
    criteria_id: String,
}

pub fn read_criteria_ids<R: Read>(source: R) -> Result<BTreeSet<CriteriaId>, ImportError> {
    let mut csv_reader = reader(source);
    let mut ids = BTreeSet::new();

    for record in csv_reader.deserialize::<CriteriaRecord>() {
        let record = record?;
        if !record.criteria_id.is_empty() {
            ids.insert(CriteriaId(record.criteria_id));
        }
    }

    Ok(ids)
}

fn strip_bom(header: &str) -> &str {
    header.trim_start_matches('\u{feff}')
}
