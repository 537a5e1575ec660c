use crate::config::ExperimentConfig;
use crate::evaluate::{ExperimentResult, StrategyResult};
use crate::loader::{load_corpus, load_queries};
use crate::normalize::Normalizer;
use crate::relevance::RelevanceTable;
use crate::retrieve::Retriever;
use anyhow::Result;
use std::path::Path;

/// Everything one evaluation run reads. Built once, read-only afterwards.
pub struct ExperimentInputs {
    pub queries: Vec<String>,
    pub relevance: RelevanceTable,
}

impl ExperimentInputs {
    /// Loads the query file and judges every corpus document against every query.
    pub fn prepare(config: &ExperimentConfig, corpus_root: &Path, queries_path: &Path) -> Result<Self> {
        let queries = load_queries(queries_path)?;
        let (docs, _read_failures) = load_corpus(corpus_root)?;
        let relevance = config.relevance.oracle().build_table(&queries, &docs);
        tracing::info!(queries = queries.len(), docs = docs.len(), threshold = relevance.threshold(), "relevance table built");
        Ok(Self { queries, relevance })
    }
}

/// Evaluates every configured strategy. A strategy whose index cannot be
/// opened is recorded as failed and the remaining strategies still run.
pub fn run_experiment(
    config: &ExperimentConfig,
    inputs: &ExperimentInputs,
    indices_root: &Path,
    normalizer: &Normalizer,
) -> ExperimentResult {
    let mut result = ExperimentResult { threshold: inputs.relevance.threshold(), strategies: Vec::new() };
    for &strategy in &config.strategies {
        let retriever = match Retriever::open(indices_root, strategy, normalizer, config.default_group, config.result_limit) {
            Ok(r) => r,
            Err(error) => {
                tracing::warn!(%strategy, error = %format!("{error:#}"), "strategy evaluation aborted");
                result.strategies.push(StrategyResult::failed(strategy, format!("{error:#}")));
                continue;
            }
        };
        let mut outcome = StrategyResult::new(strategy);
        for query in &inputs.queries {
            let ranked = retriever.retrieve(query);
            outcome.record(query, &ranked, &inputs.relevance);
        }
        match outcome.mean_average_precision() {
            Some(map) => tracing::info!(%strategy, map, evaluated = outcome.per_query.len(), "strategy evaluated"),
            None => tracing::info!(%strategy, "no query has a relevant document"),
        }
        result.strategies.push(outcome);
    }
    result
}
