mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use memrank::config::MemrankConfig;
use memrank::memory::scoring::ScoringModel;

#[derive(Parser)]
#[command(name = "memrank", version, about = "Memory relevance scoring and promotion")]
struct Cli {
    /// Config file (defaults to ~/.memrank/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score and rank candidate records
    Rank {
        /// JSON array of candidate records (reads the database when omitted)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Free-text query for pattern alignment
        #[arg(long)]
        query: Option<String>,
        /// Query anchor (repeatable)
        #[arg(long = "anchor")]
        anchors: Vec<String>,
        /// Scoring model override
        #[arg(long)]
        model: Option<ScoringModel>,
        #[arg(long)]
        limit: Option<usize>,
        /// Include per-factor breakdowns
        #[arg(long)]
        explain: bool,
    },
    /// Aggregate records into folder scores
    Folders {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        include_archived: bool,
        /// Regex of folder paths to skip (repeatable)
        #[arg(long = "exclude")]
        exclude: Vec<String>,
    },
    /// Record one validation outcome for a stored record
    Validate {
        id: String,
        #[arg(long, conflicts_with = "not_useful", required_unless_present = "not_useful")]
        useful: bool,
        #[arg(long)]
        not_useful: bool,
    },
    /// Promote a stored record to the critical tier
    Promote { id: String },
    /// Show confidence state for a stored record
    Confidence { id: String },
    /// Import a JSON array of records into the database
    Import { file: PathBuf },
    /// List records past their tier's auto-expiry age
    Expired {
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MemrankConfig::load_from(path)?,
        None => MemrankConfig::load()?,
    };

    // Log to stderr so stdout stays clean for JSON output.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Rank {
            input,
            query,
            anchors,
            model,
            limit,
            explain,
        } => cli::rank::rank(
            &config,
            &cli::rank::RankArgs {
                input,
                query,
                anchors,
                model,
                limit,
                explain,
            },
        )?,
        Command::Folders {
            input,
            limit,
            include_archived,
            exclude,
        } => cli::folders::folders(&config, input.as_deref(), limit, include_archived, exclude)?,
        Command::Validate { id, useful, .. } => cli::validate::validate(&config, &id, useful)?,
        Command::Promote { id } => cli::validate::promote(&config, &id)?,
        Command::Confidence { id } => cli::validate::confidence(&config, &id)?,
        Command::Import { file } => cli::import::import(&config, &file)?,
        Command::Expired { input } => cli::expired::expired(&config, input.as_deref())?,
    }

    Ok(())
}
