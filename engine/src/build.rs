//! Builds one fresh index per strategy from a loaded corpus.

use crate::index::{IndexWriter, InsertError, NewDocument};
use crate::loader::{load_corpus, Document, ReadFailure};
use crate::normalize::{Normalizer, Tags};
use crate::persist::{save_index, IndexPaths};
use crate::strategy::Strategy;
use anyhow::Result;
use std::path::Path;

/// A document left out of an index; the build carried on without it.
#[derive(Debug)]
pub struct Skipped {
    pub id: String,
    pub error: InsertError,
}

#[derive(Debug)]
pub struct BuildStats {
    pub strategy: Strategy,
    pub indexed: usize,
    pub skipped: Vec<Skipped>,
    pub num_tags: usize,
}

#[derive(Debug, Default)]
pub struct BuildReport {
    pub read_failures: Vec<ReadFailure>,
    pub indexes: Vec<BuildStats>,
}

impl BuildReport {
    pub fn skipped_total(&self) -> usize {
        self.read_failures.len() + self.indexes.iter().map(|s| s.skipped.len()).sum::<usize>()
    }
}

/// Stored fields must be valid UTF-8: the id comes from the path and the title
/// from the raw first line.
pub fn record_for(doc: &Document, tags: &Tags) -> Result<NewDocument, InsertError> {
    let id = doc.path.to_str().ok_or_else(|| InsertError::Unrepresentable {
        field: "id",
        reason: format!("path {} is not valid UTF-8", doc.path.display()),
    })?;
    let title = std::str::from_utf8(&doc.title).map_err(|e| InsertError::Unrepresentable {
        field: "title",
        reason: e.to_string(),
    })?;
    Ok(NewDocument { id: id.to_string(), title: title.to_string(), body: doc.body.clone(), tags: tags.string.clone() })
}

/// Destroys whatever is at `paths`, inserts every document and commits once.
/// If this returns an error the location holds no usable index.
pub fn build_index(
    strategy: Strategy,
    docs: &[Document],
    normalizer: &Normalizer,
    smoothed_idf: bool,
    paths: &IndexPaths,
) -> Result<BuildStats> {
    paths.destroy()?;
    let mut writer = IndexWriter::new(normalizer.stopwords().clone(), smoothed_idf);
    let mut skipped = Vec::new();

    for doc in docs {
        let tags = normalizer.tags(strategy, &doc.body);
        if let Err(error) = record_for(doc, &tags).and_then(|record| writer.add_document(record)) {
            let id = doc.id().into_owned();
            tracing::warn!(%strategy, doc = %id, %error, "failed");
            skipped.push(Skipped { id, error });
        }
    }

    let indexed = writer.pending();
    let index = writer.finish();
    let num_tags = index.tags.num_terms();
    save_index(paths, &index, strategy.as_str())?;
    tracing::info!(%strategy, indexed, skipped = skipped.len(), num_tags, path = %paths.root.display(), "index committed");
    Ok(BuildStats { strategy, indexed, skipped, num_tags })
}

/// Loads the corpus once and builds every requested strategy's index under `indices_root`.
pub fn build_all(
    corpus_root: &Path,
    indices_root: &Path,
    strategies: &[Strategy],
    normalizer: &Normalizer,
    smoothed_idf: bool,
) -> Result<BuildReport> {
    let (docs, read_failures) = load_corpus(corpus_root)?;
    let mut report = BuildReport { read_failures, indexes: Vec::with_capacity(strategies.len()) };
    for &strategy in strategies {
        let paths = IndexPaths::for_strategy(indices_root, strategy);
        report.indexes.push(build_index(strategy, &docs, normalizer, smoothed_idf, &paths)?);
    }
    Ok(report)
}
