use anyhow::Result;
use clap::{Parser, Subcommand};
use engine::build::build_all;
use engine::{ExperimentConfig, Strategy};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build one inverted index per normalization strategy", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the indexes from every file under a corpus directory
    Build {
        /// Corpus directory; every regular file beneath it is one document
        #[arg(long)]
        corpus: PathBuf,
        /// Root directory holding one index directory per strategy
        #[arg(long, default_value = "./indices")]
        indices: PathBuf,
        /// Strategies to build (repeatable); defaults to the configured list
        #[arg(long = "strategy")]
        strategies: Vec<Strategy>,
        /// Use smoothed IDF = ln(1 + N/df) instead of ln(N/df)
        #[arg(long, default_value_t = false)]
        smoothed_idf: bool,
        /// JSON experiment config
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { corpus, indices, strategies, smoothed_idf, config } => {
            let mut config = ExperimentConfig::load(config.as_deref())?;
            if !strategies.is_empty() {
                config.strategies = strategies;
            }
            config.smoothed_idf |= smoothed_idf;

            let normalizer = config.normalizer();
            let report = build_all(&corpus, &indices, &config.strategies, &normalizer, config.smoothed_idf)?;
            for stats in &report.indexes {
                println!("{}: indexed {} documents, skipped {}, {} distinct tags", stats.strategy, stats.indexed, stats.skipped.len(), stats.num_tags);
            }
            tracing::info!(
                indices = %indices.display(),
                unreadable = report.read_failures.len(),
                skipped = report.skipped_total(),
                "index build complete"
            );
            Ok(())
        }
    }
}
