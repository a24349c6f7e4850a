//! Soft deletion of subtrees.

use serde::{Deserialize, Serialize};

use crate::tree::ops::{collect_ids, find, find_mut, parent_id_of, remove_item};
use crate::tree::{ConfigItem, ItemKind, SYSTEM_ROOT_ID};
use crate::{Error, Result};

/// A removed subtree and where it used to live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrashcanEntry {
    /// The subtree, stored with its root disabled
    pub data: ConfigItem,
    pub add_time_ms: i64,
    /// `None` for a top-level item
    pub parent_id: Option<String>,
    /// Position among the original siblings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

/// Ordered list of trashed subtrees, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trashcan {
    entries: Vec<TrashcanEntry>,
}

impl Trashcan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TrashcanEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&TrashcanEntry> {
        self.entries.iter().find(|e| e.data.id == id)
    }

    /// Every id held anywhere in the trashcan.
    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().flat_map(|e| collect_ids(&e.data)).collect()
    }

    /// Permanently erase one entry. Returns the ids whose stored content
    /// should be deleted, empty when the entry is absent.
    pub fn purge(&mut self, id: &str) -> Vec<String> {
        match self.entries.iter().position(|e| e.data.id == id) {
            Some(idx) => collect_ids(&self.entries.remove(idx).data),
            None => Vec::new(),
        }
    }

    /// Erase every entry, returning all of their ids.
    pub fn purge_all(&mut self) -> Vec<String> {
        let ids = self.ids();
        self.entries.clear();
        ids
    }
}

/// Move the subtree rooted at `id` into `trash`.
///
/// Returns `Ok(None)` when `id` is not in the tree. The system root, default
/// items and system-file nodes are refused; system files leave through
/// management removal instead.
pub fn move_to_trashcan(
    tree: &[ConfigItem],
    trash: &mut Trashcan,
    id: &str,
    now_ms: i64,
) -> Result<Option<Vec<ConfigItem>>> {
    let Some(node) = find(tree, id) else {
        tracing::debug!(id, "Nothing to trash");
        return Ok(None);
    };

    if id == SYSTEM_ROOT_ID {
        return Err(not_allowed(id, "the system root cannot be removed"));
    }
    if node.is_default_item() {
        return Err(not_allowed(id, "default items cannot be removed"));
    }
    if node.kind == ItemKind::SystemFile {
        return Err(not_allowed(
            id,
            "system files are removed by removing management",
        ));
    }

    let parent_id = parent_id_of(tree, id);
    let mut new_tree = tree.to_vec();
    let Some((mut data, index)) = remove_item(&mut new_tree, id) else {
        return Ok(None);
    };
    data.enabled = false;

    tracing::info!(id, ?parent_id, "Moved item to trashcan");
    trash.entries.push(TrashcanEntry {
        data,
        add_time_ms: now_ms,
        parent_id,
        index: Some(index),
    });
    Ok(Some(new_tree))
}

/// Put a trashed subtree back where it was.
///
/// Returns `None` when the entry is missing or its recorded parent no
/// longer exists; the trashcan is left unchanged in both cases.
pub fn restore_from_trashcan(
    tree: &[ConfigItem],
    trash: &mut Trashcan,
    id: &str,
) -> Option<Vec<ConfigItem>> {
    let pos = trash.entries.iter().position(|e| e.data.id == id)?;
    let entry = &trash.entries[pos];

    let mut new_tree = tree.to_vec();
    let siblings = match &entry.parent_id {
        None => &mut new_tree,
        Some(parent_id) => match find_mut(&mut new_tree, parent_id) {
            Some(parent) => &mut parent.children,
            None => {
                tracing::warn!(id, parent_id, "Cannot restore, parent no longer exists");
                return None;
            }
        },
    };
    let index = entry.index.unwrap_or(siblings.len()).min(siblings.len());
    siblings.insert(index, entry.data.clone());

    trash.entries.remove(pos);
    tracing::info!(id, "Restored item from trashcan");
    Some(new_tree)
}

fn not_allowed(id: &str, reason: &str) -> Error {
    Error::NotAllowed {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}
