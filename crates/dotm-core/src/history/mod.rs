//! Bounded per-path log of prior file contents.

mod file;
mod log;

use serde::{Deserialize, Serialize};

use crate::Result;

pub use file::FileHistory;
pub use log::HistoryLog;

/// One recorded version of a target file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub id: String,
    pub file_path: String,
    pub content: String,
    pub add_time_ms: i64,
}

/// Storage of [`HistorySnapshot`]s.
///
/// Listings are ascending by time; snapshots with equal timestamps keep
/// insertion order.
pub trait HistoryStore: Send + Sync {
    fn append(&self, file_path: &str, content: &str, add_time_ms: i64) -> Result<HistorySnapshot>;

    fn list_for(&self, file_path: &str) -> Result<Vec<HistorySnapshot>>;

    /// Delete the oldest snapshots of `file_path` beyond `max`. Returns how
    /// many were removed. `max == 0` removes them all; callers treat a zero
    /// limit as unlimited and skip pruning.
    fn prune(&self, file_path: &str, max: usize) -> Result<usize>;

    /// Delete one snapshot by id.
    fn delete(&self, id: &str) -> Result<bool>;

    /// Delete every snapshot of `file_path`.
    fn clear_for(&self, file_path: &str) -> Result<usize>;

    fn latest_for(&self, file_path: &str) -> Result<Option<HistorySnapshot>> {
        Ok(self.list_for(file_path)?.pop())
    }
}

/// History kept in memory only.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    log: parking_lot::Mutex<HistoryLog>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for InMemoryHistory {
    fn append(&self, file_path: &str, content: &str, add_time_ms: i64) -> Result<HistorySnapshot> {
        Ok(self.log.lock().append(file_path, content, add_time_ms))
    }

    fn list_for(&self, file_path: &str) -> Result<Vec<HistorySnapshot>> {
        Ok(self.log.lock().list_for(file_path))
    }

    fn prune(&self, file_path: &str, max: usize) -> Result<usize> {
        Ok(self.log.lock().prune(file_path, max))
    }

    fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.log.lock().delete(id))
    }

    fn clear_for(&self, file_path: &str) -> Result<usize> {
        Ok(self.log.lock().clear_for(file_path))
    }
}
