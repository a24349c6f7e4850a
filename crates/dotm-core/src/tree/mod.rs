//! The configuration forest and the operations over it.

pub mod defaults;
pub mod item;
pub mod ops;
pub mod toggle;

pub use defaults::ensure_default_items;
pub use item::{
    ConfigItem, DEFAULT_ITEM_TITLE, FolderMode, ItemKind, ItemPatch, SYSTEM_ROOT_ID,
    default_item_id, is_default_id,
};
pub use ops::{
    add_item, ancestor_ids, collect_ids, delete_by_id, find, find_mut, flatten, is_top_level,
    next_selection, normalize, parent_of, update,
};
pub use toggle::set_enabled;
