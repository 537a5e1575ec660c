//! Multi-strategy indexing and retrieval evaluation.
//!
//! Each [`Strategy`] turns document text into tags for its own inverted index
//! and rewrites queries the same way. A [`RelevanceOracle`] judges documents
//! from raw text, independent of any strategy, and the evaluator reduces the
//! rankings of every strategy to a Mean Average Precision.

pub mod build;
pub mod config;
pub mod evaluate;
pub mod experiment;
pub mod index;
pub mod loader;
pub mod normalize;
pub mod persist;
pub mod query;
pub mod relevance;
pub mod report;
pub mod retrieve;
pub mod stem;
pub mod stopwords;
pub mod strategy;
pub mod tokenizer;

pub use config::ExperimentConfig;
pub use evaluate::{ExperimentResult, StrategyResult};
pub use index::{DocId, DocMeta, InvertedIndex, Posting, TermId};
pub use normalize::{Normalizer, Tags};
pub use relevance::{RelevanceOracle, RelevanceTable};
pub use strategy::Strategy;
