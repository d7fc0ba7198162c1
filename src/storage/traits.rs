//! Storage traits and error types
//!
//! This module defines the interface the coordinator uses to read and
//! checkpoint the catalog, and the errors a backend can report.

use crate::catalog::Package;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Catalog snapshot not found: {}", .0.display())]
    MissingSnapshot(PathBuf),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to replace snapshot: {0}")]
    Persist(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for catalog snapshot backends
///
/// A successful `save` must leave a complete, loadable catalog behind; a
/// failed one must leave the previous snapshot untouched.
pub trait CatalogStore: Send {
    /// Reads the full catalog
    ///
    /// Fails with [`StorageError::MissingSnapshot`] when nothing was saved yet.
    fn load(&self) -> StorageResult<Vec<Package>>;

    /// Replaces the stored catalog with `packages`
    fn save(&mut self, packages: &[Package]) -> StorageResult<()>;

    /// Human-readable location, for logs
    fn describe(&self) -> String;
}
