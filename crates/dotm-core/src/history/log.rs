//! The snapshot list shared by every history backend.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::HistorySnapshot;

/// All snapshots across all paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistorySnapshot>,
}

impl HistoryLog {
    pub fn append(&mut self, file_path: &str, content: &str, add_time_ms: i64) -> HistorySnapshot {
        let snapshot = HistorySnapshot {
            id: Uuid::new_v4().to_string(),
            file_path: file_path.to_string(),
            content: content.to_string(),
            add_time_ms,
        };
        self.entries.push(snapshot.clone());
        snapshot
    }

    pub fn list_for(&self, file_path: &str) -> Vec<HistorySnapshot> {
        let mut list: Vec<HistorySnapshot> = self
            .entries
            .iter()
            .filter(|s| s.file_path == file_path)
            .cloned()
            .collect();
        list.sort_by_key(|s| s.add_time_ms);
        list
    }

    pub fn prune(&mut self, file_path: &str, max: usize) -> usize {
        let list = self.list_for(file_path);
        if list.len() <= max {
            return 0;
        }
        let evict: Vec<String> = list[..list.len() - max]
            .iter()
            .map(|s| s.id.clone())
            .collect();
        self.entries.retain(|s| !evict.contains(&s.id));
        tracing::debug!(file_path, removed = evict.len(), "Pruned history");
        evict.len()
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|s| s.id != id);
        self.entries.len() != before
    }

    pub fn clear_for(&mut self, file_path: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|s| s.file_path != file_path);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
