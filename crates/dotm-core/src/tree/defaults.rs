//! Materialization of default items.

use super::item::{ConfigItem, DEFAULT_ITEM_TITLE, default_item_id};

/// Give every target-bound container its default item.
///
/// The default item is inserted as the first child when missing and is
/// always left enabled. The container is marked open.
pub fn ensure_default_items(tree: &[ConfigItem]) -> Vec<ConfigItem> {
    let mut new_tree = tree.to_vec();
    materialize(&mut new_tree);
    new_tree
}

fn materialize(list: &mut [ConfigItem]) {
    for item in list.iter_mut() {
        if item.owns_target() {
            item.folder_open = true;
            let default_id = default_item_id(&item.id);
            match item.children.iter_mut().find(|c| c.id == default_id) {
                Some(existing) => existing.enabled = true,
                None => {
                    tracing::debug!(parent = %item.id, "Materializing default item");
                    item.children.insert(
                        0,
                        ConfigItem::local(default_id, DEFAULT_ITEM_TITLE).with_enabled(true),
                    );
                }
            }
        }
        materialize(&mut item.children);
    }
}
