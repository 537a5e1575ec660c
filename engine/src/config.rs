use crate::query::Group;
use crate::normalize::Normalizer;
use crate::relevance::{MatchMode, RelevanceOracle, WeightSchedule};
use crate::stopwords::StopwordSet;
use crate::strategy::Strategy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelevanceConfig {
    pub weight_base: u64,
    /// Overrides the threshold derived from the weight schedule.
    pub threshold: Option<u64>,
    pub match_mode: MatchMode,
    /// Longest query span that is scored; `None` scores every span.
    pub max_span: Option<usize>,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self { weight_base: 5, threshold: None, match_mode: MatchMode::Presence, max_span: None }
    }
}

impl RelevanceConfig {
    pub fn schedule(&self) -> WeightSchedule {
        WeightSchedule::exponential(self.weight_base)
    }

    pub fn threshold(&self) -> u64 {
        self.threshold.unwrap_or_else(|| self.schedule().default_threshold())
    }

    pub fn oracle(&self) -> RelevanceOracle {
        RelevanceOracle::new(self.schedule(), self.threshold(), self.match_mode, self.max_span)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    pub strategies: Vec<Strategy>,
    pub result_limit: usize,
    pub default_group: Group,
    pub smoothed_idf: bool,
    pub kgram_query_stemming: bool,
    pub relevance: RelevanceConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            strategies: Strategy::ALL.to_vec(),
            result_limit: 10,
            default_group: Group::And,
            smoothed_idf: false,
            kgram_query_stemming: true,
            relevance: RelevanceConfig::default(),
        }
    }
}

impl ExperimentConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let f = File::open(path).with_context(|| format!("opening config {}", path.display()))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads `path` when given, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_json_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(StopwordSet::english()).with_kgram_query_stemming(self.kgram_query_stemming)
    }

    pub fn validate(&self) -> Result<()> {
        if self.strategies.is_empty() {
            anyhow::bail!("config lists no strategies");
        }
        if self.result_limit == 0 {
            anyhow::bail!("result_limit must be at least 1");
        }
        if self.relevance.weight_base < 2 {
            anyhow::bail!("relevance.weight_base must be at least 2");
        }
        if self.relevance.threshold() == 0 {
            anyhow::bail!("relevance threshold resolves to 0, every document would be relevant");
        }
        if self.relevance.max_span == Some(0) {
            anyhow::bail!("relevance.max_span must be at least 1");
        }
        Ok(())
    }
}
