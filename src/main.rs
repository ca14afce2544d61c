//! Trigger Eval CLI - Measure BM25 and reranker trigger quality.
//!
//! # Usage
//!
//! ```bash
//! # Index a skills directory into a corpus descriptor
//! trigger-eval index --skills-dir ~/.codex/skills --out skills_index.json
//!
//! # BM25 only
//! trigger-eval eval --skills skills_index.json --cases cases.json --top-k 5
//!
//! # BM25 + external judge, 4 cases in flight
//! trigger-eval eval --skills skills_index.json --cases cases.json \
//!     --use-reranker --concurrency 4 --timeout 60
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use edgequake_trigger_eval::{
    index_skills, load_cases, load_corpus, CommandReranker, EvalConfig, EvaluationHarness,
    Reranker, TermOverlapReranker,
};

/// Trigger evaluation for skill/tool corpora.
#[derive(Parser)]
#[command(name = "trigger-eval", version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate BM25 (and optionally a reranker) against a labeled case suite
    Eval(EvalArgs),
    /// Index SKILL.md frontmatter into a corpus descriptor
    Index(IndexArgs),
}

/// Second-stage judge implementation.
#[derive(Clone, Copy, ValueEnum)]
enum Judge {
    /// External judge process from the `[reranker]` config
    Command,
    /// Local term-overlap heuristic
    Overlap,
}

#[derive(clap::Args)]
struct EvalArgs {
    /// Corpus descriptor JSON (`{"skills": [...]}`)
    #[arg(long)]
    skills: PathBuf,

    /// Case suite JSON (`{"cases": [...]}`)
    #[arg(long)]
    cases: PathBuf,

    /// BM25 hit/recall cutoff
    #[arg(long)]
    top_k: Option<usize>,

    /// Candidate pool size handed to the reranker
    #[arg(long = "candidates")]
    candidate_n: Option<usize>,

    /// Run the reranker stage
    #[arg(long)]
    use_reranker: bool,

    /// Judge used by the reranker stage
    #[arg(long, value_enum, default_value = "command")]
    judge: Judge,

    /// Per-call reranker timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Cases evaluated concurrently
    #[arg(long)]
    concurrency: Option<usize>,

    /// Retries for a failed reranker call
    #[arg(long)]
    retries: Option<u32>,

    /// Report path
    #[arg(long)]
    out: Option<PathBuf>,

    /// Config file (default: TRIGGER_EVAL_CONFIG, ./trigger-eval.toml, ~/.edgequake/trigger-eval.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
struct IndexArgs {
    /// Skills directory (default: $CODEX_HOME/skills or ~/.codex/skills)
    #[arg(long)]
    skills_dir: Option<PathBuf>,

    /// Output JSON path
    #[arg(long, default_value = "skills_index.json")]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the summary JSON
    let default_level = if cli.verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Eval(args) => run_eval(args).await,
        Command::Index(args) => run_index(args),
    }
}

fn resolve_config(args: &EvalArgs) -> Result<EvalConfig> {
    let mut config = EvalConfig::load(args.config.as_deref()).context("loading config")?;

    if let Some(top_k) = args.top_k {
        config.top_k = top_k;
    }
    if let Some(candidate_n) = args.candidate_n {
        config.candidate_n = candidate_n;
    }
    if args.use_reranker {
        config.use_reranker = true;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(retries) = args.retries {
        config.max_retries = retries;
    }
    if let Some(out) = &args.out {
        config.output = out.clone();
    }

    config.validate()?;
    Ok(config)
}

async fn run_eval(args: EvalArgs) -> Result<()> {
    let config = resolve_config(&args)?;

    let corpus = load_corpus(&args.skills)?;
    let cases = load_cases(&args.cases)?;

    let mut harness = EvaluationHarness::new(config.harness_config());
    if config.use_reranker {
        let judge: Arc<dyn Reranker> = match args.judge {
            Judge::Command => Arc::new(CommandReranker::new(config.reranker.clone())),
            Judge::Overlap => {
                Arc::new(TermOverlapReranker::new().with_max_picks(config.reranker.max_picks))
            }
        };
        harness = harness.with_reranker(judge);
    }

    let report = harness.evaluate(&corpus, &cases).await?;
    report.write_json(&config.output)?;

    println!("{}", serde_json::to_string_pretty(&report.summary)?);
    println!("Wrote: {}", config.output.display());
    Ok(())
}

fn default_skills_dir() -> PathBuf {
    let codex_home = std::env::var_os("CODEX_HOME")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".codex")))
        .unwrap_or_else(|| PathBuf::from(".codex"));
    codex_home.join("skills")
}

fn run_index(args: IndexArgs) -> Result<()> {
    let skills_dir = args.skills_dir.unwrap_or_else(default_skills_dir);
    let descriptor = index_skills(&skills_dir);
    descriptor
        .write_json(&args.out)
        .with_context(|| format!("writing index to {}", args.out.display()))?;

    println!("Wrote {} skills to {}", descriptor.count, args.out.display());
    Ok(())
}
