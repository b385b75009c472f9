//! Textsearcher CLI
//!
//! Scans one or more documents for dictionary names and prints every
//! position found.
//!
//! # Usage
//!
//! ```bash
//! # Scan a local file with the built-in dictionary
//! cargo run --bin textsearcher --release -- big.txt
//!
//! # Several sources, 500-line chunks, JSON lines output
//! cargo run --bin textsearcher --release -- a.txt b.txt --chunk-size 500 --json
//!
//! # Remote document (requires the `http` feature)
//! cargo run --bin textsearcher --release --features http -- https://example.com/big.txt
//! ```

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use textsearcher_orchestration::source;
use textsearcher_orchestration::{
    init_tracing, ConfigError, CumulativeIndex, Dictionary, MatchMode, OutputFormat,
    PipelineConfig, PipelineCoordinator, SearchService, ShutdownOutcome, WorkerPool, WriterSink,
};
use tracing::{error, warn};

#[derive(Parser)]
#[command(name = "textsearcher")]
#[command(about = "Find dictionary names in large text documents", long_about = None)]
struct Cli {
    /// Files or http(s) URLs to scan
    #[arg(required = true)]
    sources: Vec<String>,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Lines per chunk
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Worker threads
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,

    /// Per-document deadline in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Matching policy: substring or word
    #[arg(long)]
    mode: Option<String>,

    /// Dictionary file, one name per line (default: built-in person names)
    #[arg(short, long)]
    dictionary: Option<PathBuf>,

    /// Emit JSON lines instead of text
    #[arg(long)]
    json: bool,

    /// Print per-name totals over all sources
    #[arg(long)]
    totals: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn load_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    let config = match &cli.config {
        Some(path) => PipelineConfig::from_yaml(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    let mut config = config.apply_env_overrides()?;

    if let Some(chunk_size) = cli.chunk_size {
        config.chunk_size = chunk_size;
    }
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.deadline_ms = Some(timeout_ms);
    }
    if let Some(mode) = &cli.mode {
        config.match_mode = MatchMode::from_str(mode).map_err(ConfigError::UnknownMatchMode)?;
    }

    config.validate()?;
    Ok(config)
}

fn load_dictionary(path: Option<&PathBuf>) -> anyhow::Result<Dictionary> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read dictionary {}", path.display()))?;
            Ok(Dictionary::from_lines(&text)?)
        }
        None => Ok(Dictionary::person_names()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    let dictionary = Arc::new(load_dictionary(cli.dictionary.as_ref())?);
    let pool = Arc::new(WorkerPool::new(config.concurrency)?);
    let coordinator = Arc::new(PipelineCoordinator::with_pool(
        config,
        Arc::clone(&dictionary),
        pool,
    ));

    let format = if cli.json {
        OutputFormat::JsonLines
    } else {
        OutputFormat::Text
    };
    let totals = Arc::new(CumulativeIndex::new());
    let mut service = SearchService::new(Arc::clone(&coordinator)).with_sink(Arc::new(
        WriterSink::new(std::io::stdout(), format).filtered_by(Arc::clone(&dictionary)),
    ));
    if cli.totals {
        service = service.with_sink(totals.clone());
    }

    let sources = cli
        .sources
        .iter()
        .map(String::as_str)
        .map(source::open)
        .collect::<Result<Vec<_>, _>>()?;

    let outcomes = service.run_all(&sources).await;
    let failed = outcomes
        .iter()
        .filter_map(|outcome| outcome.result.as_ref().err().map(|e| (&outcome.source_id, e)))
        .inspect(|(source_id, e)| {
            error!(source = %source_id, category = %e.category(), error = %e, "source failed")
        })
        .count();

    if cli.totals {
        let snapshot = totals.snapshot();
        println!("# totals over {} documents", snapshot.runs);
        for (name, count) in &snapshot.matches {
            println!("{}: {}", name, count);
        }
    }

    if let ShutdownOutcome::Forced { abandoned } = coordinator.shutdown().await {
        warn!(abandoned, "exited with scan tasks still running");
    }

    if failed > 0 {
        bail!("{} of {} sources failed", failed, outcomes.len());
    }
    Ok(())
}
