//! Storage module for persisting the catalog
//!
//! This module handles reading and checkpointing the catalog snapshot:
//! - The [`CatalogStore`] trait the coordinator writes through
//! - A JSON file backend with atomic replacement of the previous snapshot

mod json;
mod traits;

pub use json::{write_atomic, JsonFileStore};
pub use traits::{CatalogStore, StorageError, StorageResult};

use std::path::Path;

/// Opens the JSON snapshot store at `path`
pub fn open_storage(path: &Path) -> JsonFileStore {
    JsonFileStore::new(path)
}
