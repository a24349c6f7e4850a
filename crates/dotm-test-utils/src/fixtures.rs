//! Persisted tree documents for common layouts.
//!
//! Fixtures are plain JSON in the `tree.json` format so this crate does not
//! depend on the crates under test.

use serde_json::{Value, json};

/// A system-file node for `target` with two local fragments, `{id}-a` (on)
/// and `{id}-b` (off), plus its default item.
pub fn system_file(id: &str, target: &str) -> Value {
    json!({
        "id": id,
        "title": format!("System file {id}"),
        "on": true,
        "type": "system_file",
        "file_path": target,
        "folder_open": true,
        "children": [
            { "id": format!("{id}-default"), "title": "System Default Config", "on": true, "type": "local" },
            { "id": format!("{id}-a"), "title": "Fragment A", "on": true, "type": "local" },
            { "id": format!("{id}-b"), "title": "Fragment B", "on": false, "type": "local" },
        ],
    })
}

/// A single-choice folder with three local children, the first enabled.
pub fn single_choice_folder(id: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Profiles {id}"),
        "on": true,
        "type": "folder",
        "folder_mode": 1,
        "children": [
            { "id": format!("{id}-1"), "title": "Profile 1", "on": true, "type": "local" },
            { "id": format!("{id}-2"), "title": "Profile 2", "on": false, "type": "local" },
            { "id": format!("{id}-3"), "title": "Profile 3", "on": false, "type": "local" },
        ],
    })
}

/// Wrap top-level items into a `tree.json` document.
pub fn tree_document(list: Vec<Value>) -> String {
    let doc = json!({
        "version": 1,
        "list": list,
        "trashcan": [],
    });
    serde_json::to_string_pretty(&doc).unwrap()
}
