use crate::query::Query;
use crate::stopwords::StopwordSet;
use crate::tokenizer::{analyze, split_tags};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub type TermId = u32;
pub type DocId = u32;

/// Full-text fields of the schema. `id` is stored-only and not searchable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Title,
    Body,
    Tags,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Title, Field::Body, Field::Tags];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Body => "body",
            Field::Tags => "tags",
        }
    }
}

/// Stored fields of one indexed document. The body is indexed but not stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocMeta {
    pub external_id: String,
    pub title: String,
    pub tags: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub weight: f32, // normalized tf-idf weight
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FieldIndex {
    pub dictionary: HashMap<String, TermId>,
    pub df: Vec<u32>,
    pub postings: HashMap<TermId, Vec<Posting>>, // postings sorted by doc_id
}

impl FieldIndex {
    pub fn postings_for(&self, term: &str) -> &[Posting] {
        self.dictionary
            .get(term)
            .and_then(|tid| self.postings.get(tid))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn num_terms(&self) -> usize { self.dictionary.len() }
}

#[derive(Debug, Default)]
pub struct InvertedIndex {
    pub title: FieldIndex,
    pub body: FieldIndex,
    pub tags: FieldIndex,
    pub docs: Vec<DocMeta>, // indexed by DocId
    pub smoothed_idf: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub doc_id: DocId,
    pub external_id: String,
    pub title: String,
    pub score: f32,
}

impl InvertedIndex {
    pub fn num_docs(&self) -> u32 { self.docs.len() as u32 }

    pub fn field(&self, field: Field) -> &FieldIndex {
        match field {
            Field::Title => &self.title,
            Field::Body => &self.body,
            Field::Tags => &self.tags,
        }
    }

    pub fn doc(&self, doc_id: DocId) -> Option<&DocMeta> {
        self.docs.get(doc_id as usize)
    }

    /// Boolean match on `field`, ranked by cosine similarity between the
    /// tf-idf query vector and the normalized document weights. Equal scores
    /// keep insertion order.
    pub fn search(&self, field: Field, query: &Query, limit: usize) -> Vec<Hit> {
        let fi = self.field(field);
        let matched = query.matches(fi);
        if matched.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut tf_q_raw: HashMap<TermId, u32> = HashMap::new();
        for term in query.terms() {
            if let Some(&tid) = fi.dictionary.get(term) {
                *tf_q_raw.entry(tid).or_insert(0) += 1;
            }
        }
        let n = self.num_docs().max(1);
        let mut q_weights: HashMap<TermId, f32> = HashMap::new();
        for (tid, tf_raw) in tf_q_raw {
            let df_t = fi.df.get(tid as usize).copied().unwrap_or(1).max(1);
            q_weights.insert(tid, log_tf(tf_raw) * idf(n, df_t, self.smoothed_idf));
        }
        let mut norm = q_weights.values().map(|w| w * w).sum::<f32>().sqrt();
        if norm == 0.0 { norm = 1.0; }

        let mut scores: HashMap<DocId, f32> = matched.iter().map(|&d| (d, 0.0)).collect();
        for (tid, q_w) in q_weights {
            for p in fi.postings.get(&tid).into_iter().flatten() {
                if let Some(s) = scores.get_mut(&p.doc_id) {
                    *s += p.weight * q_w / norm;
                }
            }
        }

        let mut scored: Vec<(DocId, f32)> = scores.into_iter().collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored
            .into_iter()
            .take(limit)
            .filter_map(|(doc_id, score)| {
                self.doc(doc_id).map(|meta| Hit {
                    doc_id,
                    external_id: meta.external_id.clone(),
                    title: meta.title.clone(),
                    score,
                })
            })
            .collect()
    }
}

fn log_tf(tf_raw: u32) -> f32 {
    if tf_raw > 0 { 1.0 + (tf_raw as f32).ln() } else { 0.0 }
}

fn idf(n: u32, df_t: u32, smoothed: bool) -> f32 {
    let ratio = n as f32 / df_t as f32;
    if smoothed { (1.0 + ratio).ln() } else { ratio.ln() }
}

/// A record ready for insertion, already passed through the strategy's normalization.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub id: String,
    pub title: String,
    pub body: String,
    pub tags: String,
}

#[derive(Debug, thiserror::Error)]
pub enum InsertError {
    #[error("stored field `{field}` is not representable: {reason}")]
    Unrepresentable { field: &'static str, reason: String },
    #[error("duplicate document id `{0}`")]
    DuplicateId(String),
    #[error("document id is empty")]
    EmptyId,
}

#[derive(Default)]
struct FieldBuilder {
    dictionary: HashMap<String, TermId>,
    df: Vec<u32>,
    postings_raw: HashMap<TermId, Vec<(DocId, u32)>>,
}

impl FieldBuilder {
    fn ingest(&mut self, doc_id: DocId, tokens: Vec<String>) {
        let mut tf_counts: HashMap<TermId, u32> = HashMap::new();
        for term in tokens {
            let next = self.dictionary.len() as TermId;
            let tid = *self.dictionary.entry(term).or_insert(next);
            if self.df.len() <= tid as usize {
                self.df.resize(tid as usize + 1, 0);
            }
            *tf_counts.entry(tid).or_insert(0) += 1;
        }
        for (tid, tf_raw) in tf_counts {
            self.df[tid as usize] += 1;
            self.postings_raw.entry(tid).or_default().push((doc_id, tf_raw));
        }
    }

    fn finish(self, num_docs: u32, smoothed_idf: bool) -> FieldIndex {
        let n = num_docs.max(1);
        let mut doc_norms: Vec<f32> = vec![0.0; num_docs as usize];
        let mut weighted: HashMap<TermId, Vec<(DocId, f32)>> = HashMap::with_capacity(self.postings_raw.len());
        for (term_id, plist) in self.postings_raw {
            let df_t = self.df[term_id as usize].max(1);
            let idf = idf(n, df_t, smoothed_idf);
            let entries = plist
                .into_iter()
                .map(|(doc_id, tf_raw)| {
                    let tfidf = log_tf(tf_raw) * idf;
                    doc_norms[doc_id as usize] += tfidf * tfidf;
                    (doc_id, tfidf)
                })
                .collect();
            weighted.insert(term_id, entries);
        }
        for dn in doc_norms.iter_mut() {
            *dn = dn.sqrt();
            if *dn == 0.0 { *dn = 1.0; }
        }

        let mut postings = HashMap::with_capacity(weighted.len());
        for (term_id, plist) in weighted {
            let mut out: Vec<Posting> = plist
                .into_iter()
                .map(|(doc_id, tfidf)| Posting { doc_id, weight: tfidf / doc_norms[doc_id as usize] })
                .collect();
            out.sort_by_key(|p| p.doc_id);
            postings.insert(term_id, out);
        }
        FieldIndex { dictionary: self.dictionary, df: self.df, postings }
    }
}

/// Batch writer. Nothing is visible to searches until `finish`/commit.
pub struct IndexWriter {
    stopwords: StopwordSet,
    smoothed_idf: bool,
    docs: Vec<DocMeta>,
    ids: HashSet<String>,
    title: FieldBuilder,
    body: FieldBuilder,
    tags: FieldBuilder,
}

impl IndexWriter {
    pub fn new(stopwords: StopwordSet, smoothed_idf: bool) -> Self {
        Self {
            stopwords,
            smoothed_idf,
            docs: Vec::new(),
            ids: HashSet::new(),
            title: FieldBuilder::default(),
            body: FieldBuilder::default(),
            tags: FieldBuilder::default(),
        }
    }

    pub fn add_document(&mut self, doc: NewDocument) -> Result<DocId, InsertError> {
        if doc.id.is_empty() {
            return Err(InsertError::EmptyId);
        }
        if self.ids.contains(&doc.id) {
            return Err(InsertError::DuplicateId(doc.id));
        }
        let doc_id = self.docs.len() as DocId;
        self.title.ingest(doc_id, analyze(&doc.title, &self.stopwords));
        self.body.ingest(doc_id, analyze(&doc.body, &self.stopwords));
        self.tags.ingest(doc_id, split_tags(&doc.tags));
        self.ids.insert(doc.id.clone());
        self.docs.push(DocMeta { external_id: doc.id, title: doc.title, tags: doc.tags });
        Ok(doc_id)
    }

    pub fn pending(&self) -> usize { self.docs.len() }

    /// Computes the final weights for every field.
    pub fn finish(self) -> InvertedIndex {
        let num_docs = self.docs.len() as u32;
        tracing::debug!(num_docs, "computing tf-idf weights");
        InvertedIndex {
            title: self.title.finish(num_docs, self.smoothed_idf),
            body: self.body.finish(num_docs, self.smoothed_idf),
            tags: self.tags.finish(num_docs, self.smoothed_idf),
            docs: self.docs,
            smoothed_idf: self.smoothed_idf,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Group, QueryParser};

    fn doc(id: &str, title: &str, tags: &str) -> NewDocument {
        NewDocument { id: id.into(), title: title.into(), body: tags.into(), tags: tags.into() }
    }

    fn tiny_index() -> InvertedIndex {
        let mut w = IndexWriter::new(StopwordSet::english(), true);
        w.add_document(doc("d0", "Crude oil", "oil oil price")).unwrap();
        w.add_document(doc("d1", "Grain", "grain export")).unwrap();
        w.add_document(doc("d2", "Oil output", "oil output")).unwrap();
        w.finish()
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut w = IndexWriter::new(StopwordSet::english(), false);
        w.add_document(doc("same", "", "a")).unwrap();
        let err = w.add_document(doc("same", "", "b")).unwrap_err();
        assert!(matches!(err, InsertError::DuplicateId(_)));
        assert_eq!(w.pending(), 1);
        assert!(matches!(w.add_document(doc("", "", "c")), Err(InsertError::EmptyId)));
    }

    #[test]
    fn weights_are_unit_normalized_per_document() {
        let ix = tiny_index();
        let mut sq = 0.0f32;
        for plist in ix.tags.postings.values() {
            for p in plist.iter().filter(|p| p.doc_id == 0) {
                sq += p.weight * p.weight;
            }
        }
        assert!((sq - 1.0).abs() < 1e-5);
    }

    #[test]
    fn conjunction_requires_every_term() {
        let ix = tiny_index();
        let parser = QueryParser::new(Group::And);
        let hits = ix.search(Field::Tags, &parser.parse("oil price"), 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].external_id, "d0");
    }

    #[test]
    fn higher_term_frequency_ranks_first() {
        let ix = tiny_index();
        let parser = QueryParser::new(Group::Or);
        let hits = ix.search(Field::Tags, &parser.parse("oil"), 10);
        let ids: Vec<&str> = hits.iter().map(|h| h.external_id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"d0") && ids.contains(&"d2"));
        assert!(hits[0].score >= hits[1].score);
    }

    #[test]
    fn limit_truncates_and_unknown_terms_match_nothing() {
        let ix = tiny_index();
        let parser = QueryParser::new(Group::Or);
        assert_eq!(ix.search(Field::Tags, &parser.parse("oil grain"), 2).len(), 2);
        assert!(ix.search(Field::Tags, &parser.parse("coffee"), 10).is_empty());
    }

    #[test]
    fn title_field_is_analyzed() {
        let ix = tiny_index();
        // title terms are lowercased at index time
        let hits = ix.search(Field::Title, &Query::Term("crude".into()), 10);
        assert_eq!(hits.len(), 1);
        assert!(ix.search(Field::Title, &Query::Term("CRUDE".into()), 10).is_empty());
        assert_eq!(hits[0].title, "Crude oil");
    }
}
