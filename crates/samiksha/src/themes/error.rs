use super::decoder::RowStatus;

/// Failures raised by the theme tree operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ThemeError {
    #[error("header sequence needs at least one theme column followed by the criteria column")]
    InvalidHeaderSequence,
    #[error("column '{0}' appears more than once in the header sequence")]
    DuplicateHeader(String),
    /// No tree is produced when any row fails to decode; every row keeps its own status.
    #[error("{rejected} of {total} theme rows failed validation")]
    RowsRejected {
        rejected: usize,
        total: usize,
        statuses: Vec<RowStatus>,
    },
    #[error("not all criteria weightages were updated ({updated} of {requested})")]
    WeightageMismatch { requested: usize, updated: usize },
}
