//! History persisted to `history.json`.

use std::path::{Path, PathBuf};

use dotm_fs::ConfigStore;
use parking_lot::Mutex;

use super::{HistoryLog, HistorySnapshot, HistoryStore};
use crate::Result;

/// History backed by a JSON file, rewritten atomically on every change.
#[derive(Debug)]
pub struct FileHistory {
    path: PathBuf,
    store: ConfigStore,
    // Serializes load-modify-save cycles within this process
    guard: Mutex<()>,
}

impl FileHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            store: ConfigStore::new(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<HistoryLog> {
        Ok(self.store.load_or_default(&self.path)?)
    }

    fn modify<T>(&self, f: impl FnOnce(&mut HistoryLog) -> T) -> Result<T> {
        let _guard = self.guard.lock();
        let mut log = self.read()?;
        let out = f(&mut log);
        self.store.save(&self.path, &log)?;
        Ok(out)
    }
}

impl HistoryStore for FileHistory {
    fn append(&self, file_path: &str, content: &str, add_time_ms: i64) -> Result<HistorySnapshot> {
        self.modify(|log| log.append(file_path, content, add_time_ms))
    }

    fn list_for(&self, file_path: &str) -> Result<Vec<HistorySnapshot>> {
        let _guard = self.guard.lock();
        Ok(self.read()?.list_for(file_path))
    }

    fn prune(&self, file_path: &str, max: usize) -> Result<usize> {
        self.modify(|log| log.prune(file_path, max))
    }

    fn delete(&self, id: &str) -> Result<bool> {
        self.modify(|log| log.delete(id))
    }

    fn clear_for(&self, file_path: &str) -> Result<usize> {
        self.modify(|log| log.clear_for(file_path))
    }
}
