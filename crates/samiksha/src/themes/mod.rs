//! Theme tree engine.
//!
//! A theme upload is a flat table whose columns run from the top-level theme down through
//! nested subthemes and end with a criteria column. [`build_theme_tree`] folds the rows into
//! one nested tree per theme, [`assign_rubric_expressions`] and [`update_criteria_weightage`]
//! edit existing trees, and [`flatten`] produces the hierarchy-annotated projection stored next
//! to the tree.

pub mod builder;
pub mod criteria;
pub mod decoder;
pub mod domain;
pub mod error;
pub mod expressions;
pub mod flatten;
pub mod import;
pub mod repository;
pub mod router;
pub mod service;
pub mod weightage;

#[cfg(test)]
mod tests;

pub use builder::{build_theme_tree, ThemeTreeBuild};
pub use criteria::CriteriaLookup;
pub use decoder::{
    DecodedBatch, DecodedThemeRow, HeaderSequence, RawThemeRow, RowDecodeError, RowStatus,
    ThemeCell, ThemeMeta, ThemeMetadata, ThemeRowDecoder, FIELD_DELIMITER,
};
pub use domain::{
    CriteriaId, CriteriaWeight, FlatTheme, HierarchyEntry, Rubric, RubricLevel, SolutionId,
    ThemeNode, ThemeSummary, ThemeType,
};
pub use error::ThemeError;
pub use expressions::{
    assign_rubric_expressions, ExpressionAssignment, ExpressionRowStatus, RubricExpressionRow,
    SCORE_VARIABLE,
};
pub use flatten::flatten;
pub use import::{
    read_criteria_ids, read_expression_rows, read_theme_rows, read_weight_rows, ImportError,
    ThemeCsv,
};
pub use repository::{CriteriaRepository, RepositoryError, SolutionRepository, SolutionThemes};
pub use router::{theme_router, ThemeRouterState};
pub use service::{
    RubricUpdateReport, ThemeRowReport, ThemeService, ThemeServiceError, ThemeUploadReport,
    WeightageUpdateReport,
};
pub use weightage::{update_criteria_weightage, CriteriaWeightRow, WeightageUpdate};
