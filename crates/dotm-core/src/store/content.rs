//! Keyed storage of item content.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use dotm_fs::{io, validate_path_identifier};
use parking_lot::RwLock;

use crate::Result;

/// Keyed string-blob store holding the content of local and remote items.
pub trait ContentStore: Send + Sync {
    /// Stored content for `id`, `None` if nothing was ever stored.
    fn get(&self, id: &str) -> Result<Option<String>>;

    fn set(&self, id: &str, content: &str) -> Result<()>;

    /// Delete several blobs. Missing blobs are not an error.
    fn delete_many(&self, ids: &[String]) -> Result<()>;

    /// Stored content, empty when missing.
    fn get_or_empty(&self, id: &str) -> Result<String> {
        Ok(self.get(id)?.unwrap_or_default())
    }
}

/// One file per item id under a content directory.
#[derive(Debug, Clone)]
pub struct FileContentStore {
    dir: PathBuf,
}

impl FileContentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn blob_path(&self, id: &str) -> Result<PathBuf> {
        validate_path_identifier(id, "Item id").map_err(dotm_fs::Error::InvalidIdentifier)?;
        Ok(self.dir.join(id))
    }
}

impl ContentStore for FileContentStore {
    fn get(&self, id: &str) -> Result<Option<String>> {
        let path = self.blob_path(id)?;
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(io::read_text(&path)?))
    }

    fn set(&self, id: &str, content: &str) -> Result<()> {
        let path = self.blob_path(id)?;
        io::write_atomic(&path, content.as_bytes())?;
        tracing::debug!(id, bytes = content.len(), "Stored item content");
        Ok(())
    }

    fn delete_many(&self, ids: &[String]) -> Result<()> {
        for id in ids {
            io::remove_if_exists(&self.blob_path(id)?)?;
        }
        Ok(())
    }
}

/// In-memory store for tests and embedding hosts.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    blobs: RwLock<HashMap<String, String>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `(id, content)` pairs.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let blobs = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            blobs: RwLock::new(blobs),
        }
    }
}

impl ContentStore for MemoryContentStore {
    fn get(&self, id: &str) -> Result<Option<String>> {
        Ok(self.blobs.read().get(id).cloned())
    }

    fn set(&self, id: &str, content: &str) -> Result<()> {
        self.blobs.write().insert(id.to_string(), content.to_string());
        Ok(())
    }

    fn delete_many(&self, ids: &[String]) -> Result<()> {
        let mut blobs = self.blobs.write();
        for id in ids {
            blobs.remove(id);
        }
        Ok(())
    }
}
