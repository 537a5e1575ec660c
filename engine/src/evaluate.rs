//! Average Precision and Mean Average Precision over the relevance table.

use crate::relevance::RelevanceTable;
use crate::strategy::Strategy;
use serde::Serialize;

/// Sum of `hits / rank` over every relevant result in `ranked` (ranks start at 1).
/// Not yet divided by the number of relevant documents.
pub fn precision_sum<S: AsRef<str>>(query: &str, ranked: &[S], table: &RelevanceTable) -> f64 {
    let mut hits = 0u32;
    let mut sum = 0.0;
    for (i, doc_id) in ranked.iter().enumerate() {
        if table.is_relevant(query, doc_id.as_ref()) {
            hits += 1;
            sum += f64::from(hits) / (i + 1) as f64;
        }
    }
    sum
}

/// Average Precision, or `None` when the query has no known relevant document.
pub fn average_precision<S: AsRef<str>>(query: &str, ranked: &[S], table: &RelevanceTable) -> Option<f64> {
    match table.relevant_count(query) {
        0 => None,
        relevant => Some(precision_sum(query, ranked, table) / relevant as f64),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPrecision {
    pub query: String,
    pub average_precision: f64,
}

/// Result accumulated for one strategy over one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyResult {
    pub strategy: Strategy,
    /// Qualifying queries in query-file order.
    pub per_query: Vec<QueryPrecision>,
    /// Queries left out because no document is relevant to them.
    pub excluded: Vec<String>,
    /// Set when the strategy could not be evaluated at all.
    pub failure: Option<String>,
}

impl StrategyResult {
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy, per_query: Vec::new(), excluded: Vec::new(), failure: None }
    }

    pub fn failed(strategy: Strategy, error: impl ToString) -> Self {
        Self { failure: Some(error.to_string()), ..Self::new(strategy) }
    }

    /// Scores one query's ranking into this result.
    pub fn record<S: AsRef<str>>(&mut self, query: &str, ranked: &[S], table: &RelevanceTable) {
        match average_precision(query, ranked, table) {
            Some(ap) => self.per_query.push(QueryPrecision { query: query.to_string(), average_precision: ap }),
            None => self.excluded.push(query.to_string()),
        }
    }

    /// Arithmetic mean of the per-query AP; `None` when no query qualified.
    pub fn mean_average_precision(&self) -> Option<f64> {
        if self.failure.is_some() || self.per_query.is_empty() {
            return None;
        }
        let total: f64 = self.per_query.iter().map(|q| q.average_precision).sum();
        Some(total / self.per_query.len() as f64)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExperimentResult {
    pub threshold: u64,
    pub strategies: Vec<StrategyResult>,
}

impl ExperimentResult {
    pub fn get(&self, strategy: Strategy) -> Option<&StrategyResult> {
        self.strategies.iter().find(|r| r.strategy == strategy)
    }

    /// Successful strategies ordered by descending MAP.
    pub fn ranking(&self) -> Vec<(Strategy, f64)> {
        let mut ranked: Vec<(Strategy, f64)> = self
            .strategies
            .iter()
            .filter_map(|r| r.mean_average_precision().map(|m| (r.strategy, m)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RelevanceTable {
        let mut t = RelevanceTable::new(3);
        t.record("q", "a", 7);
        t.record("q", "b", 5);
        t.register_query("none");
        t
    }

    #[test]
    fn no_relevant_hits_is_zero() {
        let t = table();
        assert_eq!(precision_sum("q", &["x", "y"], &t), 0.0);
        assert_eq!(average_precision("q", &["x", "y"], &t), Some(0.0));
    }

    #[test]
    fn all_relevant_at_top_is_one() {
        let t = table();
        assert_eq!(precision_sum("q", &["a", "b"], &t), 2.0);
        assert_eq!(average_precision("q", &["a", "b"], &t), Some(1.0));
    }

    #[test]
    fn precision_sum_walks_ranks() {
        let t = table();
        // relevant at ranks 2 and 4: 1/2 + 2/4
        assert_eq!(precision_sum("q", &["x", "a", "y", "b"], &t), 1.0);
        assert_eq!(average_precision("q", &["x", "a", "y", "b"], &t), Some(0.5));
    }

    #[test]
    fn queries_without_relevant_docs_are_excluded() {
        let t = table();
        let mut r = StrategyResult::new(Strategy::Identity);
        r.record("none", &["a"], &t);
        assert_eq!(r.mean_average_precision(), None);
        assert_eq!(r.excluded, vec!["none"]);
        r.record("q", &["a", "b"], &t);
        r.record("q", &["x", "a"], &t);
        // (1.0 + 0.25) / 2
        assert_eq!(r.mean_average_precision(), Some(0.625));
    }

    #[test]
    fn ranking_skips_failed_and_empty_strategies() {
        let t = table();
        let mut good = StrategyResult::new(Strategy::PorterStem);
        good.record("q", &["a"], &t);
        let mut better = StrategyResult::new(Strategy::KGram4);
        better.record("q", &["a", "b"], &t);
        let result = ExperimentResult {
            threshold: 3,
            strategies: vec![good, StrategyResult::failed(Strategy::Identity, "missing"), StrategyResult::new(Strategy::KGram5), better],
        };
        assert_eq!(result.ranking(), vec![(Strategy::KGram4, 1.0), (Strategy::PorterStem, 0.5)]);
        assert!(result.get(Strategy::Identity).unwrap().failure.is_some());
    }
}
