//! Strategy-independent relevance judgments from weighted query-span matches
//! against raw document text.

use crate::loader::Document;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Whether a matching span counts once or once per occurrence in the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    Presence,
    Occurrences,
}

/// Weight per span length: `base^(len - 1)`, saturating for long spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightSchedule {
    base: u64,
}

impl WeightSchedule {
    pub fn exponential(base: u64) -> Self {
        Self { base }
    }

    pub fn weight(&self, span_len: usize) -> u64 {
        match span_len {
            0 => 0,
            n => self.base.saturating_pow(u32::try_from(n - 1).unwrap_or(u32::MAX)),
        }
    }

    /// `w(2)·w(1) − 2·w(1)`.
    pub fn default_threshold(&self) -> u64 {
        let (w1, w2) = (self.weight(1), self.weight(2));
        w2.saturating_mul(w1).saturating_sub(2 * w1)
    }
}

impl Default for WeightSchedule {
    fn default() -> Self { Self::exponential(5) }
}

#[derive(Debug, Clone)]
pub struct RelevanceOracle {
    schedule: WeightSchedule,
    threshold: u64,
    mode: MatchMode,
    max_span: Option<usize>,
}

impl RelevanceOracle {
    pub fn new(schedule: WeightSchedule, threshold: u64, mode: MatchMode, max_span: Option<usize>) -> Self {
        Self { schedule, threshold, mode, max_span }
    }

    pub fn threshold(&self) -> u64 { self.threshold }

    /// Sum of span weights for every contiguous run of query terms found,
    /// case-folded, in `text`.
    pub fn score(&self, query: &str, text: &str) -> u64 {
        self.score_folded(&query.to_lowercase(), &text.to_lowercase())
    }

    /// Same as [`score`](Self::score) for a query and text that are already lowercase.
    fn score_folded(&self, query: &str, doc: &str) -> u64 {
        let terms: Vec<&str> = query.split_whitespace().collect();
        let longest = self.max_span.map_or(terms.len(), |m| m.min(terms.len()));

        let mut score: u64 = 0;
        for i in 1..=longest {
            let weight = self.schedule.weight(i);
            for span in terms.windows(i) {
                let needle = span.join(" ");
                let hits = match self.mode {
                    MatchMode::Presence => u64::from(doc.contains(&needle)),
                    MatchMode::Occurrences => doc.matches(needle.as_str()).count() as u64,
                };
                score = score.saturating_add(hits.saturating_mul(weight));
            }
        }
        score
    }

    /// Scores every (query, document) pair once. Each text is case-folded once.
    pub fn build_table(&self, queries: &[String], docs: &[Document]) -> RelevanceTable {
        let mut table = RelevanceTable::new(self.threshold);
        let texts: Vec<(String, String)> =
            docs.iter().map(|d| (d.id().into_owned(), d.raw_text().to_lowercase())).collect();
        for query in queries {
            table.register_query(query);
            let folded = query.to_lowercase();
            for (id, text) in &texts {
                table.record(query, id, self.score_folded(&folded, text));
            }
            tracing::info!(query = %query, relevant = table.relevant_count(query), "relevance judged");
        }
        table
    }
}

impl Default for RelevanceOracle {
    fn default() -> Self {
        let schedule = WeightSchedule::default();
        Self::new(schedule, schedule.default_threshold(), MatchMode::Presence, None)
    }
}

/// query → document id → score. Only scores at or above the threshold are kept.
#[derive(Debug, Clone, Default)]
pub struct RelevanceTable {
    threshold: u64,
    judgments: HashMap<String, BTreeMap<String, u64>>,
}

impl RelevanceTable {
    pub fn new(threshold: u64) -> Self {
        Self { threshold, judgments: HashMap::new() }
    }

    pub fn threshold(&self) -> u64 { self.threshold }

    pub fn register_query(&mut self, query: &str) {
        self.judgments.entry(query.to_string()).or_default();
    }

    /// Keeps the judgment only if `score` reaches the threshold.
    pub fn record(&mut self, query: &str, doc_id: &str, score: u64) {
        let docs = self.judgments.entry(query.to_string()).or_default();
        if score >= self.threshold {
            docs.insert(doc_id.to_string(), score);
        }
    }

    pub fn score(&self, query: &str, doc_id: &str) -> Option<u64> {
        self.judgments.get(query).and_then(|docs| docs.get(doc_id)).copied()
    }

    pub fn is_relevant(&self, query: &str, doc_id: &str) -> bool {
        self.score(query, doc_id).is_some_and(|s| s >= self.threshold)
    }

    pub fn relevant_count(&self, query: &str) -> usize {
        self.judgments.get(query).map_or(0, BTreeMap::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_is_base_five() {
        let s = WeightSchedule::default();
        let w: Vec<u64> = (1..=5).map(|i| s.weight(i)).collect();
        assert_eq!(w, vec![1, 5, 25, 125, 625]);
        assert_eq!(s.weight(6), 3125);
        assert_eq!(s.weight(200), u64::MAX);
        assert_eq!(s.default_threshold(), 3);
    }

    #[test]
    fn spans_are_additive() {
        let o = RelevanceOracle::default();
        assert_eq!(o.score("oil prices", "Oil prices rose today."), 7);
        assert_eq!(o.score("oil prices", "Oil output fell."), 1);
        assert_eq!(o.score("oil prices", "Grain exports."), 0);
        // three terms, all spans present: 3*1 + 2*5 + 25
        assert_eq!(o.score("crude oil prices", "crude oil prices"), 38);
    }

    #[test]
    fn score_ignores_case() {
        let o = RelevanceOracle::default();
        let (q, d) = ("OPEC Oil Prices", "Opec said OIL PRICES would hold");
        assert_eq!(o.score(q, d), o.score(&q.to_lowercase(), &d.to_lowercase()));
    }

    #[test]
    fn appending_the_query_never_lowers_the_score() {
        for mode in [MatchMode::Presence, MatchMode::Occurrences] {
            let o = RelevanceOracle::new(WeightSchedule::default(), 3, mode, None);
            let q = "wheat export subsidies";
            let doc = "subsidies on wheat were cut; export volumes grew";
            let before = o.score(q, doc);
            let after = o.score(q, &format!("{doc} {q}"));
            assert!(after >= before);
            assert!(after > before);
        }
    }

    #[test]
    fn occurrence_mode_counts_repeats() {
        let o = RelevanceOracle::new(WeightSchedule::default(), 3, MatchMode::Occurrences, None);
        assert_eq!(o.score("oil", "oil, oil and more oil"), 3);
    }

    #[test]
    fn max_span_bounds_long_queries() {
        let o = RelevanceOracle::new(WeightSchedule::default(), 3, MatchMode::Presence, Some(1));
        assert_eq!(o.score("oil prices", "oil prices"), 2);
    }

    #[test]
    fn table_scores_agree_with_pairwise_scores() {
        let o = RelevanceOracle::default();
        let docs = vec![
            Document::from_bytes("a".into(), b"OIL PRICES climb\nOil prices rose.\n".to_vec()),
            Document::from_bytes("b".into(), b"Oil output\n".to_vec()),
        ];
        let queries = vec!["Oil Prices".to_string()];
        let table = o.build_table(&queries, &docs);
        assert_eq!(table.score("Oil Prices", "a"), Some(o.score("Oil Prices", &docs[0].raw_text())));
        assert_eq!(table.score("Oil Prices", "a"), Some(7));
        assert_eq!(table.score("Oil Prices", "b"), None);
        assert_eq!(table.relevant_count("Oil Prices"), 1);
    }

    #[test]
    fn table_keeps_only_judgments_over_threshold() {
        let mut t = RelevanceTable::new(3);
        t.record("q", "a", 7);
        t.record("q", "b", 1);
        assert_eq!(t.relevant_count("q"), 1);
        assert!(t.is_relevant("q", "a"));
        assert!(!t.is_relevant("q", "b"));
        assert_eq!(t.score("q", "b"), None);
        t.register_query("empty");
        assert_eq!(t.relevant_count("empty"), 0);
    }
}
