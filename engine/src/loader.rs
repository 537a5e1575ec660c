//! Corpus and query-file input.

use anyhow::{Context, Result};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One corpus file.
#[derive(Debug, Clone)]
pub struct Document {
    /// Relative to the corpus root when loaded through [`load_corpus`], so the
    /// id does not depend on how the root was spelled.
    pub path: PathBuf,
    /// Bytes of the first trimmed line longer than one character; empty when none exists.
    pub title: Vec<u8>,
    /// ASCII-only lines, each right-trimmed and newline terminated.
    pub body: String,
    /// Full file content, used by the relevance oracle.
    pub raw: Vec<u8>,
}

impl Document {
    pub fn from_bytes(path: PathBuf, raw: Vec<u8>) -> Self {
        let title = raw
            .split(|&b| b == b'\n')
            .map(|line| line.trim_ascii())
            .find(|line| line.len() > 1)
            .map(<[u8]>::to_vec)
            .unwrap_or_default();

        let mut body = String::new();
        for line in raw.split(|&b| b == b'\n') {
            // lines outside the single-byte range are dropped, not substituted
            if !line.is_ascii() {
                continue;
            }
            let line = line.trim_ascii_end();
            // ASCII is valid UTF-8
            body.push_str(std::str::from_utf8(line).unwrap_or_default());
            body.push('\n');
        }

        Self { path, title, body, raw }
    }

    /// Re-keys the document by its path below `root`. Paths outside `root` are kept as is.
    pub fn relative_to(mut self, root: &Path) -> Self {
        if let Ok(rel) = self.path.strip_prefix(root) {
            self.path = rel.to_path_buf();
        }
        self
    }

    /// Identifier used in the index, the relevance table and reports.
    pub fn id(&self) -> Cow<'_, str> {
        self.path.to_string_lossy()
    }

    pub fn raw_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw)
    }
}

/// Reads one file. The handle is dropped before returning on every path.
pub fn load_document(path: &Path) -> io::Result<Document> {
    let mut raw = Vec::new();
    {
        let mut f = File::open(path)?;
        f.read_to_end(&mut raw)?;
    }
    Ok(Document::from_bytes(path.to_path_buf(), raw))
}

/// Every regular file beneath `root`, sorted so runs are reproducible.
pub fn corpus_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        anyhow::bail!("corpus directory {} does not exist", root.display());
    }
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable corpus entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();
    files.sort();
    Ok(files)
}

/// A document that could not be read from disk.
#[derive(Debug)]
pub struct ReadFailure {
    pub path: PathBuf,
    pub error: io::Error,
}

/// Loads every corpus file, collecting read failures instead of aborting.
/// Documents are identified by their path relative to `root`.
pub fn load_corpus(root: &Path) -> Result<(Vec<Document>, Vec<ReadFailure>)> {
    let mut docs = Vec::new();
    let mut failures = Vec::new();
    for path in corpus_files(root)? {
        match load_document(&path) {
            Ok(doc) => docs.push(doc.relative_to(root)),
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "failed to read document");
                failures.push(ReadFailure { path, error });
            }
        }
    }
    tracing::info!(num_docs = docs.len(), failed = failures.len(), root = %root.display(), "loaded corpus");
    Ok((docs, failures))
}

/// One query per line, trimmed, blank lines ignored, first occurrence of a duplicate kept.
pub fn load_queries(path: &Path) -> Result<Vec<String>> {
    let f = File::open(path).with_context(|| format!("opening query file {}", path.display()))?;
    let reader = BufReader::new(f);
    let mut seen = HashSet::new();
    let mut queries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let q = line.trim();
        if q.is_empty() || !seen.insert(q.to_string()) {
            continue;
        }
        queries.push(q.to_string());
    }
    Ok(queries)
}
