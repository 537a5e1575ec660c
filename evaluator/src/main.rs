use anyhow::Result;
use clap::Parser;
use evaluator::{run, Args};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let evaluation = run(&args)?;
    print!("{}", evaluation.rendered);
    for (strategy, map) in evaluation.result.ranking() {
        tracing::info!(%strategy, map, "mean average precision");
    }
    Ok(())
}
