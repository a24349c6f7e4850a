//! Traversal, lookup and copy-based mutation of the configuration forest.
//!
//! Every public mutation takes the tree by reference and returns a new one.
//! No parent pointers are kept; parent lookup is a scan.

use uuid::Uuid;

use super::item::{ConfigItem, ItemPatch};
use crate::{Error, Result};

/// Every node in pre-order, each node before its children.
pub fn flatten(tree: &[ConfigItem]) -> Vec<&ConfigItem> {
    let mut out = Vec::new();
    let mut stack: Vec<&ConfigItem> = tree.iter().rev().collect();
    while let Some(item) = stack.pop() {
        out.push(item);
        stack.extend(item.children.iter().rev());
    }
    out
}

pub fn find<'a>(tree: &'a [ConfigItem], id: &str) -> Option<&'a ConfigItem> {
    flatten(tree).into_iter().find(|item| item.id == id)
}

pub fn find_mut<'a>(tree: &'a mut [ConfigItem], id: &str) -> Option<&'a mut ConfigItem> {
    for item in tree.iter_mut() {
        if item.id == id {
            return Some(item);
        }
        if let Some(found) = find_mut(&mut item.children, id) {
            return Some(found);
        }
    }
    None
}

/// Whether `id` is a top-level item.
pub fn is_top_level(tree: &[ConfigItem], id: &str) -> bool {
    tree.iter().any(|item| item.id == id)
}

/// The node whose direct children include `id`.
///
/// Top-level items have no parent.
pub fn parent_of<'a>(tree: &'a [ConfigItem], id: &str) -> Option<&'a ConfigItem> {
    if is_top_level(tree, id) {
        return None;
    }
    flatten(tree)
        .into_iter()
        .find(|p| p.children.iter().any(|c| c.id == id))
}

pub(crate) fn parent_id_of(tree: &[ConfigItem], id: &str) -> Option<String> {
    parent_of(tree, id).map(|p| p.id.clone())
}

/// Ids from `id`'s parent up to its top-level ancestor, nearest first.
pub fn ancestor_ids(tree: &[ConfigItem], id: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = id.to_string();
    while let Some(parent) = parent_id_of(tree, &current) {
        out.push(parent.clone());
        current = parent;
    }
    out
}

/// Shallow-merge `patch` into the node with `id`. No-op when absent.
pub fn update(tree: &[ConfigItem], id: &str, patch: &ItemPatch) -> Vec<ConfigItem> {
    let mut new_tree = tree.to_vec();
    if let Some(item) = find_mut(&mut new_tree, id) {
        patch.apply(item);
    }
    new_tree
}

/// Remove the first node with `id`, checking the top level before
/// descending.
pub fn delete_by_id(tree: &[ConfigItem], id: &str) -> Vec<ConfigItem> {
    let mut new_tree = tree.to_vec();
    remove_item(&mut new_tree, id);
    new_tree
}

/// In-place removal returning the removed subtree and its index among its
/// siblings.
pub(crate) fn remove_item(list: &mut Vec<ConfigItem>, id: &str) -> Option<(ConfigItem, usize)> {
    if let Some(idx) = list.iter().position(|item| item.id == id) {
        return Some((list.remove(idx), idx));
    }
    list.iter_mut()
        .find_map(|item| remove_item(&mut item.children, id))
}

/// Pick a replacement selection after the matching items go away.
///
/// Returns the item right after the last match in pre-order, else the one
/// right before the first match.
pub fn next_selection<F>(tree: &[ConfigItem], predicate: F) -> Option<&ConfigItem>
where
    F: Fn(&ConfigItem) -> bool,
{
    let flat = flatten(tree);
    let first = flat.iter().position(|item| predicate(*item))?;
    let last = flat.iter().rposition(|item| predicate(*item)).unwrap_or(first);

    flat.get(last + 1)
        .or_else(|| first.checked_sub(1).and_then(|i| flat.get(i)))
        .copied()
}

/// Ids of `item` and all of its descendants.
pub fn collect_ids(item: &ConfigItem) -> Vec<String> {
    flatten(std::slice::from_ref(item))
        .into_iter()
        .map(|i| i.id.clone())
        .collect()
}

/// Add `item` at the top level or as the last child of `parent_id`.
///
/// `taken` lists ids already used elsewhere (the trashcan).
pub fn add_item(
    tree: &[ConfigItem],
    parent_id: Option<&str>,
    mut item: ConfigItem,
    taken: &[String],
) -> Result<Vec<ConfigItem>> {
    if item.id.is_empty() {
        item.id = new_id();
    }

    let existing: Vec<&str> = flatten(tree).into_iter().map(|i| i.id.as_str()).collect();
    for id in collect_ids(&item) {
        if existing.contains(&id.as_str()) || taken.contains(&id) {
            return Err(Error::DuplicateId { id });
        }
    }

    let mut new_tree = tree.to_vec();
    match parent_id {
        None => new_tree.push(item),
        Some(pid) => {
            let parent = find_mut(&mut new_tree, pid).ok_or_else(|| Error::InvalidId {
                id: pid.to_string(),
            })?;
            if !parent.kind.is_container() {
                return Err(Error::NotAllowed {
                    id: pid.to_string(),
                    reason: format!("a {} item cannot hold children", parent.kind),
                });
            }
            parent.children.push(item);
        }
    }
    Ok(new_tree)
}

/// Give every item without an id a fresh one.
pub fn normalize(tree: &[ConfigItem]) -> Vec<ConfigItem> {
    fn walk(list: &mut [ConfigItem]) {
        for item in list {
            if item.id.is_empty() {
                item.id = new_id();
            }
            walk(&mut item.children);
        }
    }

    let mut new_tree = tree.to_vec();
    walk(&mut new_tree);
    new_tree
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::item::ItemKind;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<ConfigItem> {
        vec![
            ConfigItem::local("a", "A"),
            ConfigItem::folder("f", "F").with_children(vec![
                ConfigItem::local("f1", "F1"),
                ConfigItem::folder("g", "G").with_children(vec![ConfigItem::local("g1", "G1")]),
            ]),
            ConfigItem::local("b", "B"),
        ]
    }

    fn ids(items: &[&ConfigItem]) -> Vec<String> {
        items.iter().map(|i| i.id.clone()).collect()
    }

    #[test]
    fn flatten_is_preorder() {
        let tree = sample();
        assert_eq!(ids(&flatten(&tree)), ["a", "f", "f1", "g", "g1", "b"]);
    }

    #[test]
    fn parent_lookup() {
        let tree = sample();
        assert!(parent_of(&tree, "a").is_none());
        assert_eq!(parent_of(&tree, "g1").unwrap().id, "g");
        assert_eq!(parent_of(&tree, "f1").unwrap().id, "f");
        assert!(parent_of(&tree, "missing").is_none());
        assert_eq!(ancestor_ids(&tree, "g1"), ["g", "f"]);
    }

    #[test]
    fn update_merges_and_ignores_missing() {
        let tree = sample();
        let patch = ItemPatch {
            title: Some("renamed".into()),
            ..ItemPatch::default()
        };
        let updated = update(&tree, "g1", &patch);
        assert_eq!(find(&updated, "g1").unwrap().title, "renamed");
        assert_eq!(find(&tree, "g1").unwrap().title, "G1");

        assert_eq!(update(&tree, "nope", &patch), tree);
    }

    #[test]
    fn delete_removes_exactly_one() {
        let tree = sample();
        let deleted = delete_by_id(&tree, "g");
        assert_eq!(ids(&flatten(&deleted)), ["a", "f", "f1", "b"]);
        assert_eq!(delete_by_id(&tree, "missing"), tree);
    }

    #[test]
    fn next_selection_prefers_following_item() {
        let tree = sample();
        assert_eq!(next_selection(&tree, |i| i.id == "f1").unwrap().id, "g");
        assert_eq!(next_selection(&tree, |i| i.id == "b").unwrap().id, "g1");
        assert!(next_selection(&tree, |i| i.id == "missing").is_none());

        let single = vec![ConfigItem::local("only", "Only")];
        assert!(next_selection(&single, |i| i.id == "only").is_none());
    }

    #[test]
    fn add_rejects_duplicates_and_non_containers() {
        let tree = sample();
        let added = add_item(&tree, Some("g"), ConfigItem::local("g2", "G2"), &[]).unwrap();
        assert_eq!(parent_of(&added, "g2").unwrap().id, "g");

        let dup = add_item(&tree, None, ConfigItem::local("f1", "dup"), &[]);
        assert!(matches!(dup, Err(Error::DuplicateId { .. })));

        let trashed = add_item(&tree, None, ConfigItem::local("t", "T"), &["t".to_string()]);
        assert!(matches!(trashed, Err(Error::DuplicateId { .. })));

        let leaf = add_item(&tree, Some("a"), ConfigItem::local("x", "X"), &[]);
        assert!(matches!(leaf, Err(Error::NotAllowed { .. })));
    }

    #[test]
    fn add_assigns_missing_id() {
        let added = add_item(&[], None, ConfigItem::new("", "New", ItemKind::Local), &[]).unwrap();
        assert!(!added[0].id.is_empty());
    }

    #[test]
    fn normalize_fills_ids() {
        let tree = vec![ConfigItem::folder("", "F").with_children(vec![ConfigItem::local("", "x")])];
        let normalized = normalize(&tree);
        let flat = flatten(&normalized);
        assert!(flat.iter().all(|i| !i.id.is_empty()));
        assert_ne!(flat[0].id, flat[1].id);
    }

    #[test]
    fn collect_ids_covers_subtree() {
        let tree = sample();
        assert_eq!(collect_ids(&tree[1]), ["f", "f1", "g", "g1"]);
    }
}
