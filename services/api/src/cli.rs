use crate::commands::{
    run_export, run_generate, run_score, run_search, run_stats, ExportArgs, GenerateArgs,
    ScoreArgs, SearchArgs, StatsArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use linkenchamba::config::AppConfig;
use linkenchamba::error::AppError;
use linkenchamba::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "LinkenChamba",
    about = "Score entry-level candidates and match them to open roles",
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
    /// Generate a synthetic candidate database
    Generate(GenerateArgs),
    /// List the best candidates for a role
    Search(SearchArgs),
    /// Print per-role score statistics
    Stats(StatsArgs),
    /// Export candidates and scores as CSV
    Export(ExportArgs),
    /// Score a questionnaire response read from JSON
    Score(ScoreArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Keep candidates in memory instead of the database file
    #[arg(long)]
    pub(crate) in_memory: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match command {
        Command::Serve(args) => server::run(config, args).await,
        Command::Generate(args) => run_generate(&config, args),
        Command::Search(args) => run_search(&config, args),
        Command::Stats(args) => run_stats(&config, args),
        Command::Export(args) => run_export(&config, args),
        Command::Score(args) => run_score(&config, args),
    }
}
