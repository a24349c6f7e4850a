//! Persistence collaborators: item content blobs and the tree document.

mod content;
mod tree;

pub use content::{ContentStore, FileContentStore, MemoryContentStore};
pub use tree::{TREE_FORMAT_VERSION, TreeDocument, TreeStore};
