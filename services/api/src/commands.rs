use chrono::{Local, NaiveDate};
use clap::Args;
use linkenchamba::candidates::search::{
    DEFAULT_MIN_SCORE, DEFAULT_RESULT_LIMIT, TOP_CANDIDATES_PER_ROLE,
};
use linkenchamba::candidates::{
    export_csv, rank_candidates, role_statistics, store, CandidateDatabase, CandidateGenerator,
    CandidateServiceError, RankedCandidate, RoleStatistics, DEFAULT_CANDIDATE_COUNT,
};
use linkenchamba::config::AppConfig;
use linkenchamba::error::AppError;
use linkenchamba::scoring::{QuestionnaireResponse, ScoreBand, ScoreSet, Scorer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct GenerateArgs {
    /// Number of synthetic candidates
    #[arg(long, default_value_t = DEFAULT_CANDIDATE_COUNT)]
    pub(crate) count: usize,
    /// Seed for a reproducible database
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Output file (defaults to CANDIDATE_DB_PATH)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Registration dates fall in the year before this date (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) reference_date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct SearchArgs {
    /// Role name exactly as listed in the catalog
    #[arg(long)]
    pub(crate) role: String,
    /// Minimum score for the role
    #[arg(long, default_value_t = DEFAULT_MIN_SCORE)]
    pub(crate) min_score: f64,
    /// Maximum number of candidates to list
    #[arg(long, default_value_t = DEFAULT_RESULT_LIMIT)]
    pub(crate) limit: usize,
    /// Candidate database (defaults to CANDIDATE_DB_PATH)
    #[arg(long)]
    pub(crate) db: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct StatsArgs {
    /// Candidate database (defaults to CANDIDATE_DB_PATH)
    #[arg(long)]
    pub(crate) db: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Candidate database (defaults to CANDIDATE_DB_PATH)
    #[arg(long)]
    pub(crate) db: Option<PathBuf>,
    /// CSV destination (defaults to stdout)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Questionnaire response JSON (defaults to stdin)
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
}

pub(crate) fn run_generate(config: &AppConfig, args: GenerateArgs) -> Result<(), AppError> {
    let scorer = crate::infra::scorer(&config.scoring);
    let path = args.output.clone().unwrap_or_else(|| config.store.path.clone());

    let database = generate_database(scorer.clone(), &args);
    store::save(&path, &database)?;
    info!(path = %path.display(), candidates = database.total_candidates, "candidate database generated");

    let statistics = role_statistics(
        &database.candidates,
        scorer.catalog(),
        TOP_CANDIDATES_PER_ROLE,
    );
    let mut out = io::stdout().lock();
    writeln!(
        out,
        "Generated {} candidates into {}",
        database.total_candidates,
        path.display()
    )?;
    write_statistics(&mut out, &statistics)?;
    Ok(())
}

pub(crate) fn run_search(config: &AppConfig, args: SearchArgs) -> Result<(), AppError> {
    let scorer = crate::infra::scorer(&config.scoring);
    let database = load_database(config, args.db.as_deref(), &scorer)?;
    let hits = search_database(&database, &scorer, &args)?;
    write_hits(&mut io::stdout().lock(), &args.role, args.min_score, &hits)?;
    Ok(())
}

pub(crate) fn run_stats(config: &AppConfig, args: StatsArgs) -> Result<(), AppError> {
    let scorer = crate::infra::scorer(&config.scoring);
    let database = load_database(config, args.db.as_deref(), &scorer)?;
    let statistics = role_statistics(
        &database.candidates,
        scorer.catalog(),
        TOP_CANDIDATES_PER_ROLE,
    );
    write_statistics(&mut io::stdout().lock(), &statistics)?;
    Ok(())
}

pub(crate) fn run_export(config: &AppConfig, args: ExportArgs) -> Result<(), AppError> {
    let scorer = crate::infra::scorer(&config.scoring);
    let database = load_database(config, args.db.as_deref(), &scorer)?;

    let written = match args.output.as_deref() {
        Some(path) => export_csv(&database.candidates, scorer.catalog(), fs::File::create(path)?)?,
        None => export_csv(&database.candidates, scorer.catalog(), io::stdout().lock())?,
    };
    info!(rows = written, "candidates exported");
    Ok(())
}

pub(crate) fn run_score(config: &AppConfig, args: ScoreArgs) -> Result<(), AppError> {
    let scorer = crate::infra::scorer(&config.scoring);
    let responses = match args.input.as_deref() {
        Some(path) => read_responses(BufReader::new(fs::File::open(path)?))?,
        None => read_responses(io::stdin().lock())?,
    };
    write_scores(&mut io::stdout().lock(), &scorer.score_all(&responses))?;
    Ok(())
}

fn generate_database(scorer: Scorer, args: &GenerateArgs) -> CandidateDatabase {
    let reference_date = args
        .reference_date
        .unwrap_or_else(|| Local::now().date_naive());
    let generator = CandidateGenerator::new(scorer, reference_date);
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    generator.generate(args.count, &mut rng)
}

fn load_database(
    config: &AppConfig,
    path: Option<&Path>,
    scorer: &Scorer,
) -> Result<CandidateDatabase, AppError> {
    let path = path.unwrap_or(config.store.path.as_path());
    Ok(store::load(path, scorer.catalog())?)
}

fn search_database(
    database: &CandidateDatabase,
    scorer: &Scorer,
    args: &SearchArgs,
) -> Result<Vec<RankedCandidate>, AppError> {
    let role = scorer
        .catalog()
        .find(&args.role)
        .ok_or_else(|| CandidateServiceError::UnknownRole(args.role.trim().to_string()))?;
    Ok(rank_candidates(
        &database.candidates,
        role,
        args.min_score,
        args.limit,
    ))
}

fn read_responses<R: Read>(reader: R) -> Result<QuestionnaireResponse, AppError> {
    serde_json::from_reader(reader).map_err(|err| AppError::Io(io::Error::from(err)))
}

fn write_statistics<W: Write>(out: &mut W, statistics: &[RoleStatistics]) -> io::Result<()> {
    for entry in statistics {
        writeln!(out, "{} ({} candidates)", entry.role, entry.candidates)?;
        match (entry.mean, entry.max, entry.min) {
            (Some(mean), Some(max), Some(min)) => {
                writeln!(out, "  mean {mean:.2}%  max {max:.2}%  min {min:.2}%")?;
            }
            _ => writeln!(out, "  no scores yet")?,
        }
        for (rank, top) in entry.top.iter().enumerate() {
            writeln!(out, "  {}. {} {:.2}%", rank + 1, top.name, top.score)?;
        }
    }
    Ok(())
}

fn write_hits<W: Write>(
    out: &mut W,
    role: &str,
    min_score: f64,
    hits: &[RankedCandidate],
) -> io::Result<()> {
    if hits.is_empty() {
        return writeln!(
            out,
            "No candidates scored at least {min_score:.0}% for {}",
            role.trim()
        );
    }

    writeln!(out, "{} candidates for {}", hits.len(), role.trim())?;
    for hit in hits {
        writeln!(
            out,
            "  {:.2}% [{}] {} <{}> {}",
            hit.score,
            hit.band.label(),
            hit.name,
            hit.email,
            hit.phone
        )?;
    }
    Ok(())
}

fn write_scores<W: Write>(out: &mut W, scores: &ScoreSet) -> io::Result<()> {
    for (role, score) in scores.iter() {
        writeln!(out, "{role}: {score:.2}% ({})", ScoreBand::of(score).label())?;
    }
    Ok(())
}
