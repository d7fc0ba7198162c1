//! JSON file snapshot backend
//!
//! The catalog is stored as a single JSON array of packages. Every save goes
//! through a temporary file in the same directory which is flushed, synced
//! and then renamed over the previous snapshot.

use crate::catalog::Package;
use crate::storage::traits::{CatalogStore, StorageError, StorageResult};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Catalog snapshot kept in one JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by `path`; nothing is touched on disk yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogStore for JsonFileStore {
    fn load(&self) -> StorageResult<Vec<Package>> {
        if !self.path.exists() {
            return Err(StorageError::MissingSnapshot(self.path.clone()));
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let packages: Vec<Package> = serde_json::from_reader(reader)?;
        tracing::debug!(
            "Loaded {} packages from {}",
            packages.len(),
            self.path.display()
        );
        Ok(packages)
    }

    fn save(&mut self, packages: &[Package]) -> StorageResult<()> {
        tracing::debug!("Saving catalog to {}", self.path.display());
        write_atomic(&self.path, |writer| {
            serde_json::to_writer(writer, packages)?;
            Ok(())
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Writes a file atomically
///
/// `write` receives a buffered writer over a temporary file created next to
/// `path`. Only when it returns `Ok` and the data is synced to disk is the
/// temporary file renamed onto `path`. On any error the temporary file is
/// removed and `path` keeps its previous content.
pub fn write_atomic<F>(path: &Path, write: F) -> StorageResult<()>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> StorageResult<()>,
{
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;

    tmp.persist(path)
        .map_err(|e| StorageError::Persist(e.error.to_string()))?;
    Ok(())
}
