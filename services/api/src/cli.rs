use crate::offline::{
    run_build, run_flatten, run_rubric, run_weightage, BuildArgs, FlattenArgs, RubricArgs,
    WeightageArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use samiksha::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Samiksha Rubric Engine",
    about = "Serve and run the assessment theme/rubric engine from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Work on theme uploads offline and print the results as JSON
    Themes {
        #[command(subcommand)]
        command: ThemesCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ThemesCommand {
    /// Build a theme tree from a theme upload CSV
    Build(BuildArgs),
    /// Attach rubric expressions from a CSV to a theme tree
    Rubric(RubricArgs),
    /// Rewrite criteria weightage from a CSV in a theme tree
    Weightage(WeightageArgs),
    /// Print the flattened projection of a theme tree
    Flatten(FlattenArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Themes { command } => match command {
            ThemesCommand::Build(args) => run_build(args),
            ThemesCommand::Rubric(args) => run_rubric(args),
            ThemesCommand::Weightage(args) => run_weightage(args),
            ThemesCommand::Flatten(args) => run_flatten(args),
        },
    }
}
