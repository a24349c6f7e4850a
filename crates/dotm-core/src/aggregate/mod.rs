//! Resolving which fragments feed which target file.

pub mod merge;

use std::collections::{HashMap, HashSet};

use dotm_fs::is_json_path;

use crate::store::ContentStore;
use crate::tree::ops::{ancestor_ids, find, flatten};
use crate::tree::{ConfigItem, FolderMode, ItemKind};

pub use merge::{deep_merge, join_text_contents, merge_json_contents};

/// Aggregated content destined for one target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedFile {
    /// Target path as stored on the owning item, unresolved
    pub file_path: String,
    pub content: String,
}

/// Computes per-target content from the tree and stored item content.
pub struct ContentAggregator<'a> {
    store: &'a dyn ContentStore,
    cascade_all: bool,
}

impl<'a> ContentAggregator<'a> {
    pub fn new(store: &'a dyn ContentStore, cascade_all: bool) -> Self {
        Self { store, cascade_all }
    }

    /// Content of every managed target, in traversal order.
    ///
    /// Enabled local items contribute to the target of their own
    /// `file_path` or of their nearest target-bound container. Groups and
    /// remote items are display-only and never feed a target.
    /// Every target-bound container appears even with nothing enabled under
    /// it, mapped to empty content.
    pub fn compute_managed_file_contents(&self, tree: &[ConfigItem]) -> Vec<ManagedFile> {
        let mut order: Vec<String> = Vec::new();
        let mut contributions: HashMap<String, Vec<String>> = HashMap::new();

        for item in flatten(tree) {
            if item.kind.is_container()
                && let Some(path) = item.target_path()
            {
                register(&mut order, &mut contributions, path);
                continue;
            }
            if !contributes(item) {
                continue;
            }
            let Some(path) = owning_path(tree, item) else {
                tracing::debug!(id = %item.id, "Enabled item has no target file");
                continue;
            };
            let content = self.resolve_item_content(tree, &item.id);
            let slot = register(&mut order, &mut contributions, &path);
            if !content.is_empty() {
                slot.push(content);
            }
        }

        order
            .into_iter()
            .map(|file_path| {
                let contents = contributions.remove(&file_path).unwrap_or_default();
                let content = if is_json_path(&file_path) {
                    merge_json_contents(&contents)
                } else {
                    join_text_contents(&contents)
                };
                ManagedFile { file_path, content }
            })
            .collect()
    }

    /// Display content of one item.
    ///
    /// Local and remote items yield their stored content. Groups concatenate
    /// their included items and folders their enabled children, each block
    /// headed by `# file: {title}`; folders only when cascade-all is on and
    /// they are not single-choice. Unknown ids yield an empty string.
    pub fn resolve_item_content(&self, tree: &[ConfigItem], id: &str) -> String {
        let mut visiting = HashSet::new();
        self.resolve(tree, id, &mut visiting)
    }

    fn resolve(&self, tree: &[ConfigItem], id: &str, visiting: &mut HashSet<String>) -> String {
        let Some(item) = find(tree, id) else {
            return String::new();
        };
        if !visiting.insert(id.to_string()) {
            tracing::warn!(id, "Group include cycle, skipping");
            return String::new();
        }

        let content = match item.kind {
            ItemKind::Local | ItemKind::Remote => self.stored(id),
            ItemKind::Group => {
                let blocks: Vec<String> = item
                    .include
                    .iter()
                    .filter_map(|inc| find(tree, inc))
                    .map(|inc| block(inc, &self.resolve(tree, &inc.id, visiting)))
                    .collect();
                join_text_contents(&blocks)
            }
            ItemKind::Folder if self.cascade_all && item.folder_mode != FolderMode::Single => {
                let blocks: Vec<String> = item
                    .children
                    .iter()
                    .filter(|c| c.enabled && !c.is_default_item())
                    .map(|c| block(c, &self.resolve(tree, &c.id, visiting)))
                    .collect();
                join_text_contents(&blocks)
            }
            ItemKind::Folder | ItemKind::SystemFile => String::new(),
        };

        visiting.remove(id);
        content
    }

    fn stored(&self, id: &str) -> String {
        match self.store.get_or_empty(id) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(id, error = %e, "Failed to read item content");
                String::new()
            }
        }
    }
}

fn register<'m>(
    order: &mut Vec<String>,
    contributions: &'m mut HashMap<String, Vec<String>>,
    path: &str,
) -> &'m mut Vec<String> {
    if !contributions.contains_key(path) {
        order.push(path.to_string());
    }
    contributions.entry(path.to_string()).or_default()
}

fn block(item: &ConfigItem, content: &str) -> String {
    format!("# file: {}\n{}", item.title, content)
}

fn contributes(item: &ConfigItem) -> bool {
    item.enabled && !item.is_default_item() && item.kind == ItemKind::Local
}

/// The item's own target, else that of its nearest target-bound container.
fn owning_path(tree: &[ConfigItem], item: &ConfigItem) -> Option<String> {
    if let Some(path) = item.target_path() {
        return Some(path.to_string());
    }
    ancestor_ids(tree, &item.id)
        .iter()
        .filter_map(|id| find(tree, id))
        .find(|a| a.owns_target())
        .and_then(|a| a.target_path())
        .map(str::to_string)
}
