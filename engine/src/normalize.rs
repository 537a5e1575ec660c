//! Per-strategy normalization of document text into tags, and of raw query
//! strings into searchable tag queries.

use crate::query::OR_OPERATOR;
use crate::stem::{PorterStemmer, SnowballStemmer, Stem};
use crate::stopwords::StopwordSet;
use crate::strategy::Strategy;
use std::collections::BTreeSet;

/// Normalized tags of one document under one strategy.
///
/// `set` holds the distinct tags; `string` keeps every emitted tag in order,
/// duplicates included, and is what the index field receives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    pub set: BTreeSet<String>,
    pub string: String,
}

impl Tags {
    fn push(&mut self, tag: &str) {
        if !self.string.is_empty() {
            self.string.push(' ');
        }
        self.string.push_str(tag);
        self.set.insert(tag.to_string());
    }

    /// Number of tags in the tag string.
    pub fn emitted(&self) -> usize {
        self.string.split_whitespace().count()
    }
}

/// All contiguous windows of `k` chars, in order. Tokens shorter than `k` yield nothing.
pub fn kgrams(token: &str, k: usize) -> Vec<String> {
    let chars: Vec<char> = token.chars().collect();
    if k == 0 || chars.len() < k {
        return Vec::new();
    }
    chars.windows(k).map(|w| w.iter().collect()).collect()
}

fn strip_punctuation(text: &str) -> String {
    text.chars().filter(|c| !c.is_ascii_punctuation()).collect()
}

pub struct Normalizer {
    stopwords: StopwordSet,
    porter: PorterStemmer,
    snowball: SnowballStemmer,
    kgram_query_stemming: bool,
}

impl Normalizer {
    pub fn new(stopwords: StopwordSet) -> Self {
        Self { stopwords, porter: PorterStemmer, snowball: SnowballStemmer::english(), kgram_query_stemming: true }
    }

    /// Query-side k-gram transformation stems with Snowball before windowing
    /// unless disabled here; document-side k-gram tagging never stems.
    pub fn with_kgram_query_stemming(mut self, enabled: bool) -> Self {
        self.kgram_query_stemming = enabled;
        self
    }

    pub fn stopwords(&self) -> &StopwordSet { &self.stopwords }

    /// Punctuation stripped, split on whitespace, lowercased, stopwords removed.
    fn surviving_tokens(&self, text: &str) -> Vec<String> {
        strip_punctuation(text)
            .split_whitespace()
            .map(str::to_lowercase)
            .filter(|t| !self.stopwords.contains(t))
            .collect()
    }

    pub fn tags(&self, strategy: Strategy, text: &str) -> Tags {
        let mut tags = Tags::default();
        for token in self.surviving_tokens(text) {
            match strategy {
                Strategy::Identity => tags.push(&token),
                Strategy::PorterStem => tags.push(&self.porter.stem(&token)),
                Strategy::SnowballStem => tags.push(&self.snowball.stem(&token)),
                Strategy::KGram4 | Strategy::KGram5 => {
                    let k = strategy.kgram_len().unwrap_or(4);
                    for gram in kgrams(&token, k) {
                        tags.push(&gram);
                    }
                }
            }
        }
        tags
    }

    /// Rewrites a raw query into the space-joined tag form of `strategy`.
    /// Query tokens are not stopword filtered. A bare `OR` operator is kept
    /// verbatim for the query parser.
    pub fn transform_query(&self, query: &str, strategy: Strategy) -> String {
        let mut out: Vec<String> = Vec::new();
        for raw in query.split_whitespace() {
            if raw == OR_OPERATOR {
                out.push(raw.to_string());
                continue;
            }
            let token = strip_punctuation(raw).to_lowercase();
            if token.is_empty() {
                continue;
            }
            match strategy {
                Strategy::Identity => out.push(token),
                Strategy::PorterStem => out.push(self.porter.stem(&token)),
                Strategy::SnowballStem => out.push(self.snowball.stem(&token)),
                Strategy::KGram4 | Strategy::KGram5 => {
                    let k = strategy.kgram_len().unwrap_or(4);
                    let base = if self.kgram_query_stemming { self.snowball.stem(&token) } else { token };
                    out.extend(kgrams(&base, k));
                }
            }
        }
        out.join(" ")
    }
}

impl Default for Normalizer {
    fn default() -> Self { Self::new(StopwordSet::english()) }
}
