use crate::index::{DocMeta, Field, FieldIndex, InvertedIndex};
use crate::strategy::Strategy;
use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub created_at: String,
    pub version: u32,
    pub label: String,
    pub smoothed_idf: bool,
}

/// On-disk location of one index.
#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    pub fn for_strategy<P: AsRef<Path>>(indices_root: P, strategy: Strategy) -> Self {
        Self::new(indices_root.as_ref().join(strategy.index_dir_name()))
    }

    fn staging(&self) -> PathBuf { self.root.with_extension("staging") }
    fn docs(dir: &Path) -> PathBuf { dir.join("docs.bin") }
    fn meta(dir: &Path) -> PathBuf { dir.join("meta.json") }
    fn field(dir: &Path, field: Field) -> PathBuf { dir.join("fields").join(format!("{}.bin", field.as_str())) }

    pub fn exists(&self) -> bool { Self::meta(&self.root).is_file() }

    /// Removes any index and leftover staging data at this location.
    pub fn destroy(&self) -> Result<()> {
        for dir in [&self.root, &self.staging()] {
            if dir.exists() {
                fs::remove_dir_all(dir).with_context(|| format!("removing {}", dir.display()))?;
            }
        }
        Ok(())
    }
}

fn write_bin<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut f = File::create(path)?;
    let bytes = bincode::serialize(value)?;
    f.write_all(&bytes)?;
    Ok(())
}

fn read_bin<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let mut f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let value = bincode::deserialize(&buf)?;
    Ok(value)
}

/// Writes the whole index into a staging directory and moves it into place
/// once every file is complete. Any previous index at the location is replaced.
pub fn save_index(paths: &IndexPaths, index: &InvertedIndex, label: &str) -> Result<()> {
    let staging = paths.staging();
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    create_dir_all(staging.join("fields"))?;

    write_bin(&IndexPaths::docs(&staging), &index.docs)?;
    for field in Field::ALL {
        write_bin(&IndexPaths::field(&staging, field), index.field(field))?;
    }
    let meta = MetaFile {
        num_docs: index.num_docs(),
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default(),
        version: FORMAT_VERSION,
        label: label.to_string(),
        smoothed_idf: index.smoothed_idf,
    };
    let json = serde_json::to_string_pretty(&meta)?;
    File::create(IndexPaths::meta(&staging))?.write_all(json.as_bytes())?;

    if paths.root.exists() {
        fs::remove_dir_all(&paths.root)?;
    }
    fs::rename(&staging, &paths.root)
        .with_context(|| format!("moving staged index into {}", paths.root.display()))?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(IndexPaths::meta(&paths.root))
        .with_context(|| format!("no index at {}", paths.root.display()))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

pub fn load_index(paths: &IndexPaths) -> Result<InvertedIndex> {
    let meta = load_meta(paths)?;
    if meta.version != FORMAT_VERSION {
        bail!("index at {} has format version {}, expected {}", paths.root.display(), meta.version, FORMAT_VERSION);
    }
    let docs: Vec<DocMeta> = read_bin(&IndexPaths::docs(&paths.root))?;
    if docs.len() != meta.num_docs as usize {
        bail!("index at {} is inconsistent: meta lists {} docs, found {}", paths.root.display(), meta.num_docs, docs.len());
    }
    let title: FieldIndex = read_bin(&IndexPaths::field(&paths.root, Field::Title))?;
    let body: FieldIndex = read_bin(&IndexPaths::field(&paths.root, Field::Body))?;
    let tags: FieldIndex = read_bin(&IndexPaths::field(&paths.root, Field::Tags))?;
    Ok(InvertedIndex { title, body, tags, docs, smoothed_idf: meta.smoothed_idf })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexWriter, NewDocument};
    use crate::stopwords::StopwordSet;
    use tempfile::tempdir;

    fn one_doc_index(id: &str) -> InvertedIndex {
        let mut w = IndexWriter::new(StopwordSet::english(), false);
        w.add_document(NewDocument { id: id.into(), title: "t".into(), body: "oil".into(), tags: "oil".into() }).unwrap();
        w.finish()
    }

    #[test]
    fn saved_index_reopens() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::for_strategy(dir.path(), Strategy::KGram4);
        save_index(&paths, &one_doc_index("a"), "kgram4").unwrap();
        assert!(paths.root.ends_with("kgram4_index"));
        let ix = load_index(&paths).unwrap();
        assert_eq!(ix.num_docs(), 1);
        assert_eq!(ix.docs[0].external_id, "a");
        assert_eq!(ix.tags.postings_for("oil").len(), 1);
        assert_eq!(load_meta(&paths).unwrap().label, "kgram4");
    }

    #[test]
    fn save_replaces_previous_contents() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path().join("ix"));
        save_index(&paths, &one_doc_index("old"), "x").unwrap();
        fs::write(paths.root.join("stale.txt"), "leftover").unwrap();
        save_index(&paths, &one_doc_index("new"), "x").unwrap();
        assert!(!paths.root.join("stale.txt").exists());
        assert_eq!(load_index(&paths).unwrap().docs[0].external_id, "new");
        assert!(!paths.staging().exists());
    }

    #[test]
    fn missing_index_is_an_error() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path().join("nope"));
        assert!(!paths.exists());
        assert!(load_index(&paths).is_err());
    }
}
