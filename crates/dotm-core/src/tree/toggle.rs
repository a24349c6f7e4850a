//! The enable/disable algorithm.

use super::item::{ConfigItem, FolderMode, ItemKind};
use super::ops::{ancestor_ids, find_mut, is_top_level, parent_id_of};

/// Switch one item on or off and apply the consequences.
///
/// With `cascade_all`, the new state flows down into folder subtrees
/// (stopping at single-choice folders) and up through every ancestor: off
/// turns each ancestor off, on sets each ancestor to whether all its direct
/// children are now on. Enabling then enforces single-choice exclusivity on
/// the target's sibling group, where the top level is one group governed by
/// `default_mode`.
///
/// Default items are never switched off. An unknown id returns the tree
/// unchanged.
pub fn set_enabled(
    tree: &[ConfigItem],
    id: &str,
    enabled: bool,
    default_mode: FolderMode,
    cascade_all: bool,
) -> Vec<ConfigItem> {
    let mut new_tree = tree.to_vec();

    let Some(target) = find_mut(&mut new_tree, id) else {
        return new_tree;
    };
    if target.is_default_item() {
        tracing::debug!(id, "Default items are always enabled");
        return new_tree;
    }

    target.enabled = enabled;
    if cascade_all {
        cascade_down(target, enabled);
        derive_ancestors(&mut new_tree, id, enabled);
    }

    if !enabled {
        return new_tree;
    }

    if is_top_level(&new_tree, id) {
        if default_mode == FolderMode::Single {
            for other in new_tree.iter_mut().filter(|i| i.id != id) {
                switch_off(other, cascade_all);
            }
        }
    } else if let Some(parent_id) = parent_id_of(&new_tree, id)
        && let Some(parent) = find_mut(&mut new_tree, &parent_id)
        && parent.folder_mode.or(default_mode) == FolderMode::Single
    {
        for sibling in parent.children.iter_mut().filter(|c| c.id != id) {
            switch_off(sibling, cascade_all);
        }
    }

    new_tree
}

fn switch_off(item: &mut ConfigItem, cascade_all: bool) {
    if item.is_default_item() {
        return;
    }
    item.enabled = false;
    if cascade_all {
        cascade_down(item, false);
    }
}

/// Propagate `enabled` into a folder's subtree. Single-choice folders keep
/// their children's state.
fn cascade_down(item: &mut ConfigItem, enabled: bool) {
    if item.kind != ItemKind::Folder || item.folder_mode == FolderMode::Single {
        return;
    }
    for child in item.children.iter_mut() {
        if !child.is_default_item() {
            child.enabled = enabled;
        }
        cascade_down(child, enabled);
    }
}

fn derive_ancestors(tree: &mut [ConfigItem], id: &str, enabled: bool) {
    for ancestor_id in ancestor_ids(tree, id) {
        let Some(ancestor) = find_mut(tree, &ancestor_id) else {
            break;
        };
        ancestor.enabled = if enabled {
            ancestor.children.iter().all(|c| c.enabled)
        } else {
            false
        };
    }
}
