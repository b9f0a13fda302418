//! Disk-backed cache of deserialized tables.

use crate::error::Result;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Processing tier a cache entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStage {
    /// Deserialized source table, byte-stable across loads.
    Raw,
    /// Output of the cleaning/filtering/aggregation pipeline.
    Processed,
}

impl CacheStage {
    fn dir_name(&self) -> &'static str {
        match self {
            CacheStage::Raw => "raw",
            CacheStage::Processed => "processed",
        }
    }
}

/// Narrow interface over the on-disk table cache.
///
/// Existence of an entry is its only validity signal: once written, an
/// entry is served forever, even if the source it was derived from has
/// changed. [`CacheStore::remove`] is the out-of-band invalidation hook;
/// nothing in the pipeline calls it implicitly. Keeping this policy behind
/// one type lets a content-hash strategy replace it without touching the
/// pipeline.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Create a store rooted at `root`. The directory tree is created
    /// lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the entry for `name` at `stage`.
    pub fn entry_path(&self, stage: CacheStage, name: &str) -> PathBuf {
        let file_name = match stage {
            CacheStage::Raw => format!("{name}.parquet"),
            CacheStage::Processed => format!("{name}_processed.parquet"),
        };
        self.root.join(stage.dir_name()).join(file_name)
    }

    /// Whether an entry exists for `name` at `stage`.
    pub fn contains(&self, stage: CacheStage, name: &str) -> bool {
        self.entry_path(stage, name).exists()
    }

    /// Read an entry back as a frame.
    pub fn read(&self, stage: CacheStage, name: &str) -> Result<DataFrame> {
        let path = self.entry_path(stage, name);
        debug!("Reading cache entry {}", path.display());
        let file = File::open(&path)?;
        let df = ParquetReader::new(file).finish()?;
        Ok(df)
    }

    /// Persist a fully computed frame as the entry for `name` at `stage`.
    ///
    /// Callers must only pass completed tables; a failure before this point
    /// leaves no partial entry behind.
    pub fn write(&self, stage: CacheStage, name: &str, df: &mut DataFrame) -> Result<()> {
        let path = self.entry_path(stage, name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        debug!("Writing cache entry {}", path.display());
        let file = File::create(&path)?;
        ParquetWriter::new(file).finish(df)?;
        Ok(())
    }

    /// Delete the entry for `name` at `stage`, if present.
    ///
    /// Returns whether an entry was removed. This is the only way to force
    /// recomputation after a source file changes.
    pub fn remove(&self, stage: CacheStage, name: &str) -> Result<bool> {
        let path = self.entry_path(stage, name);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path)?;
        debug!("Removed cache entry {}", path.display());
        Ok(true)
    }

    /// Root directory this store writes under.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("open_covid_region_code".into(), vec!["US-CA", "US-NY"]),
            Column::new("hospitalized_new".into(), vec![1i64, 2]),
        ])
        .unwrap()
    }

    #[test]
    fn test_entry_paths() {
        let store = CacheStore::new("/data");
        assert_eq!(
            store.entry_path(CacheStage::Raw, "cases"),
            PathBuf::from("/data/raw/cases.parquet")
        );
        assert_eq!(
            store.entry_path(CacheStage::Processed, "cases"),
            PathBuf::from("/data/processed/cases_processed.parquet")
        );
    }

    #[test]
    fn test_write_read_remove_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let mut df = sample_frame();

        assert!(!store.contains(CacheStage::Raw, "cases"));
        store.write(CacheStage::Raw, "cases", &mut df).unwrap();
        assert!(store.contains(CacheStage::Raw, "cases"));

        let read_back = store.read(CacheStage::Raw, "cases").unwrap();
        assert!(read_back.equals_missing(&df));

        assert!(store.remove(CacheStage::Raw, "cases").unwrap());
        assert!(!store.contains(CacheStage::Raw, "cases"));
        assert!(!store.remove(CacheStage::Raw, "cases").unwrap());
    }
}
