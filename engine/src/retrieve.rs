use crate::index::{Field, Hit, InvertedIndex};
use crate::normalize::Normalizer;
use crate::persist::{load_index, IndexPaths};
use crate::query::{Group, QueryParser};
use crate::strategy::Strategy;
use anyhow::{Context, Result};
use std::path::Path;

/// Runs raw queries against one strategy's index through that strategy's
/// query transformation. Results are returned exactly as the index ranks them.
pub struct Retriever<'a> {
    strategy: Strategy,
    index: InvertedIndex,
    parser: QueryParser,
    normalizer: &'a Normalizer,
    limit: usize,
}

impl<'a> Retriever<'a> {
    pub fn new(strategy: Strategy, index: InvertedIndex, normalizer: &'a Normalizer, group: Group, limit: usize) -> Self {
        let parser = QueryParser::new(group);
        Self { strategy, index, parser, normalizer, limit }
    }

    /// Fails when the strategy's index location is missing or unreadable.
    pub fn open(indices_root: &Path, strategy: Strategy, normalizer: &'a Normalizer, group: Group, limit: usize) -> Result<Self> {
        let paths = IndexPaths::for_strategy(indices_root, strategy);
        let index = load_index(&paths).with_context(|| format!("opening {strategy} index"))?;
        tracing::debug!(%strategy, num_docs = index.num_docs(), "index opened");
        Ok(Self::new(strategy, index, normalizer, group, limit))
    }

    pub fn strategy(&self) -> Strategy { self.strategy }

    pub fn search(&self, query: &str) -> Vec<Hit> {
        let transformed = self.normalizer.transform_query(query, self.strategy);
        let parsed = self.parser.parse(&transformed);
        let hits = self.index.search(Field::Tags, &parsed, self.limit);
        tracing::debug!(strategy = %self.strategy, query, transformed = %transformed, hits = hits.len(), "retrieved");
        hits
    }

    /// Ranked document ids, at most `limit` of them.
    pub fn retrieve(&self, query: &str) -> Vec<String> {
        self.search(query).into_iter().map(|h| h.external_id).collect()
    }
}
