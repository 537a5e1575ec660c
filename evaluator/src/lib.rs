use anyhow::{Context, Result};
use clap::Parser;
use engine::experiment::{run_experiment, ExperimentInputs};
use engine::report::{render_json, render_text};
use engine::{ExperimentConfig, ExperimentResult, Strategy};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "evaluator")]
#[command(about = "Score every strategy's index against a query set and report MAP")]
pub struct Args {
    /// Corpus directory the indexes were built from
    #[arg(long)]
    pub corpus: PathBuf,
    /// Query file, one query per line
    #[arg(long, default_value = "./queries.txt")]
    pub queries: PathBuf,
    /// Root directory holding one index directory per strategy
    #[arg(long, default_value = "./indices")]
    pub indices: PathBuf,
    /// Where the rendered report is written
    #[arg(long, default_value = "./experiment_results.txt")]
    pub results: PathBuf,
    /// Render the report as JSON instead of text
    #[arg(long, default_value_t = false)]
    pub json: bool,
    /// JSON experiment config
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Ranked results considered per query
    #[arg(long)]
    pub limit: Option<usize>,
    /// Strategies to evaluate (repeatable); defaults to the configured list
    #[arg(long = "strategy")]
    pub strategies: Vec<Strategy>,
}

pub struct Evaluation {
    pub result: ExperimentResult,
    pub rendered: String,
}

/// CLI flags take precedence over the config file.
pub fn resolve_config(args: &Args) -> Result<ExperimentConfig> {
    let mut config = ExperimentConfig::load(args.config.as_deref())?;
    if let Some(limit) = args.limit {
        config.result_limit = limit;
    }
    if !args.strategies.is_empty() {
        config.strategies = args.strategies.clone();
    }
    config.validate()?;
    Ok(config)
}

pub fn run(args: &Args) -> Result<Evaluation> {
    let config = resolve_config(args)?;
    let normalizer = config.normalizer();
    let inputs = ExperimentInputs::prepare(&config, &args.corpus, &args.queries)?;
    let result = run_experiment(&config, &inputs, &args.indices, &normalizer);

    let rendered = if args.json { render_json(&result)? } else { render_text(&result) };
    fs::write(&args.results, &rendered)
        .with_context(|| format!("writing results to {}", args.results.display()))?;
    tracing::info!(results = %args.results.display(), "report written");
    Ok(Evaluation { result, rendered })
}
