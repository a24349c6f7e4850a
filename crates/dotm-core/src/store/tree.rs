//! Persistence of the live tree and the trashcan.

use std::path::{Path, PathBuf};

use dotm_fs::ConfigStore;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::trashcan::Trashcan;
use crate::tree::{ConfigItem, ensure_default_items, normalize};

/// Current `tree.json` format version.
pub const TREE_FORMAT_VERSION: u32 = 1;

fn current_version() -> u32 {
    TREE_FORMAT_VERSION
}

/// Everything kept in `tree.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeDocument {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub list: Vec<ConfigItem>,
    #[serde(default)]
    pub trashcan: Trashcan,
}

impl Default for TreeDocument {
    fn default() -> Self {
        Self {
            version: TREE_FORMAT_VERSION,
            list: Vec::new(),
            trashcan: Trashcan::new(),
        }
    }
}

/// Loads and saves the [`TreeDocument`] with atomic writes.
#[derive(Debug, Clone)]
pub struct TreeStore {
    path: PathBuf,
    store: ConfigStore,
}

impl TreeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            store: ConfigStore::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document, or an empty one if the file does not exist yet.
    ///
    /// Items persisted without an id get a fresh one.
    pub fn load(&self) -> Result<TreeDocument> {
        let mut doc: TreeDocument = self.store.load_or_default(&self.path)?;
        doc.list = normalize(&doc.list);
        Ok(doc)
    }

    /// Save the document, materializing default items first.
    pub fn save(&self, doc: &mut TreeDocument) -> Result<()> {
        doc.list = ensure_default_items(&doc.list);
        doc.version = TREE_FORMAT_VERSION;
        self.store.save(&self.path, doc)?;
        tracing::debug!(path = ?self.path, items = doc.list.len(), "Saved tree");
        Ok(())
    }
}
