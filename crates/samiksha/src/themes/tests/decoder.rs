use super::common::*;
use serde_json::json;

use crate::themes::decoder::{
    parse_int_prefix, HeaderSequence, RowDecodeError, RowStatus, ThemeMetadata, ThemeRowDecoder,
};
use crate::themes::domain::{CriteriaId, ThemeType};
use crate::themes::error::ThemeError;

#[test]
fn decodes_theme_triads_and_criteria_pairs() {
    let headers = three_level_headers();
    let criteria = sample_criteria();
    let decoder = ThemeRowDecoder::new(&headers, &criteria);
    let mut metadata = ThemeMetadata::default();

    let row = decoder.decode(&sample_rows()[0], &mut metadata);

    assert_eq!(row.status, RowStatus::Pending);
    let theme = row.cells.get("theme").expect("theme cell");
    assert_eq!(theme.name, "Safety");
    assert_eq!(theme.external_id, "S1");
    assert_eq!(theme.weightage, 50.0);
    let criteria = row.criteria.expect("criteria cell");
    assert_eq!(criteria.criteria_id, CriteriaId::from("C1"));
    assert_eq!(criteria.weightage, 10.0);

    let safety = metadata.get("Safety").expect("theme registered");
    assert_eq!(safety.label, "theme");
    assert_eq!(safety.theme_type, ThemeType::Theme);
    let fire = metadata.get("Fire").expect("subtheme registered");
    assert_eq!(fire.label, "subtheme");
    assert_eq!(fire.theme_type, ThemeType::Subtheme);
    assert_eq!(fire.external_id, "S1a");
}

#[test]
fn cell_without_external_id_marks_row_and_skips_cell() {
    let headers = three_level_headers();
    let criteria = sample_criteria();
    let decoder = ThemeRowDecoder::new(&headers, &criteria);
    let mut metadata = ThemeMetadata::default();

    let row = decoder.decode(
        &raw_row(&[
            ("theme", "Safety"),
            ("subtheme", "Fire###S1a"),
            ("criteriaInternalId", "C1###10"),
        ]),
        &mut metadata,
    );

    assert_eq!(
        row.status,
        RowStatus::Failed(RowDecodeError::MissingNameOrExternalId {
            column: "theme".to_string()
        })
    );
    assert_eq!(row.status.to_string(), "Missing name/externalId");
    assert!(!row.cells.contains_key("theme"));
    assert!(row.cells.contains_key("subtheme"));
    assert!(metadata.get("Safety").is_none());
}

#[test]
fn unknown_criteria_marks_row() {
    let headers = three_level_headers();
    let criteria = sample_criteria();
    let decoder = ThemeRowDecoder::new(&headers, &criteria);
    let mut metadata = ThemeMetadata::default();

    let row = decoder.decode(
        &raw_row(&[
            ("theme", "Safety###S1"),
            ("subtheme", ""),
            ("criteriaInternalId", "C404###10"),
        ]),
        &mut metadata,
    );

    assert_eq!(row.status.to_string(), "Criteria is not Present");
    assert!(row.criteria.is_none());
}

#[test]
fn first_failure_is_kept() {
    let headers = three_level_headers();
    let criteria = sample_criteria();
    let decoder = ThemeRowDecoder::new(&headers, &criteria);
    let mut metadata = ThemeMetadata::default();

    let row = decoder.decode(
        &raw_row(&[
            ("theme", "###S1"),
            ("subtheme", ""),
            ("criteriaInternalId", "C404"),
        ]),
        &mut metadata,
    );

    assert!(matches!(
        row.status,
        RowStatus::Failed(RowDecodeError::MissingNameOrExternalId { .. })
    ));
}

#[test]
fn empty_and_unlisted_cells_are_ignored() {
    let headers = headers(&["theme", "criteria"]);
    let criteria = known_criteria(&["C1"]);
    let decoder = ThemeRowDecoder::new(&headers, &criteria);
    let mut metadata = ThemeMetadata::default();

    let row = decoder.decode(
        &raw_row(&[
            ("theme", "  "),
            ("criteria", ""),
            ("notes", "free text"),
        ]),
        &mut metadata,
    );

    assert_eq!(row.status, RowStatus::Pending);
    assert!(row.cells.is_empty());
    assert!(row.criteria.is_none());
    assert!(metadata.is_empty());
}

#[test]
fn weightage_uses_leading_integer_or_zero() {
    assert_eq!(parse_int_prefix("50"), 50.0);
    assert_eq!(parse_int_prefix("12.9"), 12.0);
    assert_eq!(parse_int_prefix(" 7kg"), 7.0);
    assert_eq!(parse_int_prefix("-5"), -5.0);
    assert_eq!(parse_int_prefix("abc"), 0.0);
    assert_eq!(parse_int_prefix(""), 0.0);

    let headers = headers(&["theme", "criteria"]);
    let criteria = known_criteria(&["C1"]);
    let decoder = ThemeRowDecoder::new(&headers, &criteria);
    let mut metadata = ThemeMetadata::default();
    let row = decoder.decode(
        &raw_row(&[("theme", "Safety###S1"), ("criteria", "C1")]),
        &mut metadata,
    );
    assert_eq!(row.cells["theme"].weightage, 0.0);
    assert_eq!(row.criteria.expect("criteria").weightage, 0.0);
}

#[test]
fn decode_all_threads_metadata_across_rows() {
    let headers = three_level_headers();
    let criteria = sample_criteria();
    let batch = ThemeRowDecoder::new(&headers, &criteria).decode_all(&sample_rows());

    assert_eq!(batch.rows.len(), 4);
    assert_eq!(batch.metadata.len(), 4);
    assert!(batch.metadata.get("Learning").is_some());
}

#[test]
fn header_sequence_requires_theme_and_criteria_columns() {
    assert_eq!(
        HeaderSequence::new(["criteria"]),
        Err(ThemeError::InvalidHeaderSequence)
    );
    assert_eq!(
        HeaderSequence::new(["theme", " ", "criteria", "theme"]),
        Err(ThemeError::DuplicateHeader("theme".to_string()))
    );

    let sequence = HeaderSequence::new(["theme", "", "domain", "criteria"]).expect("valid");
    assert_eq!(sequence.columns(), ["theme", "domain", "criteria"]);
    assert_eq!(sequence.theme_columns(), ["theme", "domain"]);
    assert_eq!(sequence.criteria_column(), "criteria");
    assert_eq!(sequence.root_column(), "theme");
}

#[test]
fn row_status_serializes_as_message() {
    assert_eq!(serde_json::to_value(RowStatus::Pending).unwrap(), json!(""));
    assert_eq!(
        serde_json::to_value(RowStatus::Success).unwrap(),
        json!("success")
    );
    assert_eq!(
        serde_json::to_value(RowStatus::Failed(RowDecodeError::UnknownCriteria {
            criteria_id: "C9".to_string()
        }))
        .unwrap(),
        json!("Criteria is not Present")
    );
}
