use clap::Args;
use samiksha::config::AppConfig;
use samiksha::error::AppError;
use samiksha::themes::{
    assign_rubric_expressions, build_theme_tree, flatten, read_criteria_ids,
    read_expression_rows, read_theme_rows, read_weight_rows, update_criteria_weightage,
    HeaderSequence, RawThemeRow, RowStatus, ThemeError, ThemeNode,
};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct BuildArgs {
    /// Theme upload CSV; column order is the header sequence, criteria column last
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// CSV with a `criteriaId` column listing the known criteria
    #[arg(long)]
    pub(crate) criteria: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct RubricArgs {
    /// JSON file holding the nested theme tree
    #[arg(long)]
    pub(crate) themes: PathBuf,
    /// Expression CSV with `externalId`, `name`, optional `weightage` and one column per level
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Comma separated rubric levels; defaults to the configured `APP_RUBRIC_LEVELS`
    #[arg(long, value_delimiter = ',')]
    pub(crate) levels: Option<Vec<String>>,
}

#[derive(Args, Debug)]
pub(crate) struct WeightageArgs {
    /// JSON file holding the nested theme tree
    #[arg(long)]
    pub(crate) themes: PathBuf,
    /// CSV with `criteriaId` and `weightage` columns
    #[arg(long)]
    pub(crate) csv: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct FlattenArgs {
    /// JSON file holding the nested theme tree
    #[arg(long)]
    pub(crate) themes: PathBuf,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RowOutput<'a> {
    #[serde(flatten)]
    row: &'a RawThemeRow,
    status: &'a RowStatus,
}

pub(crate) fn run_build(args: BuildArgs) -> Result<(), AppError> {
    let criteria = read_criteria_ids(File::open(&args.criteria)?)?;
    let upload = read_theme_rows(File::open(&args.csv)?)?;
    let headers = HeaderSequence::new(upload.headers.clone())?;

    match build_theme_tree(&upload.rows, &headers, &criteria) {
        Ok(build) => {
            let rows = row_output(&upload.rows, &build.statuses);
            let flattened = flatten(&build.themes);
            print_json(&serde_json::json!({
                "rows": rows,
                "themes": build.themes,
                "flattenedThemes": flattened,
            }))
        }
        Err(ThemeError::RowsRejected {
            rejected,
            total,
            statuses,
        }) => {
            print_json(&serde_json::json!({ "rows": row_output(&upload.rows, &statuses) }))?;
            Err(ThemeError::RowsRejected {
                rejected,
                total,
                statuses,
            }
            .into())
        }
        Err(other) => Err(other.into()),
    }
}

pub(crate) fn run_rubric(args: RubricArgs) -> Result<(), AppError> {
    let mut themes = load_themes(&args.themes)?;
    let mut rows = read_expression_rows(File::open(&args.csv)?)?;

    let levels = rubric_levels(args.levels)?;
    let assignment = assign_rubric_expressions(&mut themes, &mut rows, &levels);
    print_json(&serde_json::json!({
        "matchedRows": assignment.matched_rows,
        "rows": rows,
        "themes": themes,
        "flattenedThemes": assignment.flattened,
    }))
}

pub(crate) fn run_weightage(args: WeightageArgs) -> Result<(), AppError> {
    let themes = load_themes(&args.themes)?;
    let rows = read_weight_rows(File::open(&args.csv)?)?;

    let update = update_criteria_weightage(&themes, &rows)?;
    print_json(&serde_json::json!({
        "updated": update.updated,
        "themes": update.themes,
        "flattenedThemes": update.flattened,
    }))
}

pub(crate) fn run_flatten(args: FlattenArgs) -> Result<(), AppError> {
    let themes = load_themes(&args.themes)?;
    print_json(&flatten(&themes))
}

/// Explicit levels win; otherwise the configured rubric levels apply.
fn rubric_levels(levels: Option<Vec<String>>) -> Result<Vec<String>, AppError> {
    match levels {
        Some(levels) => Ok(levels),
        None => Ok(AppConfig::load()?.rubric.levels),
    }
}

fn row_output<'a>(rows: &'a [RawThemeRow], statuses: &'a [RowStatus]) -> Vec<RowOutput<'a>> {
    rows.iter()
        .zip(statuses)
        .map(|(row, status)| RowOutput { row, status })
        .collect()
}

fn load_themes(path: &Path) -> Result<Vec<ThemeNode>, AppError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
