//! Locating the managed region inside raw file content.

use crate::markers::{CONTENT_END, CONTENT_START};

/// The managed region of a file, as byte offsets into the raw content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedRegion<'a> {
    /// Offset of the first byte of the opening sentinel.
    pub start: usize,
    /// Offset one past the last byte of the closing sentinel.
    pub end: usize,
    /// Text between the sentinels, without the surrounding blank lines.
    pub content: &'a str,
}

/// Find the managed region in `raw`.
///
/// Uses the first occurrence of each sentinel. Returns `None` unless both
/// are present and the closing sentinel comes after the opening one.
///
/// # Example
/// ```
/// use dotm_blocks::parser::find_managed_region;
///
/// let raw = "a=1\n\n# --- DOTFILE_MANAGER_CONTENT_START ---\n\nb=2\n\n# --- DOTFILE_MANAGER_CONTENT_END ---";
/// let region = find_managed_region(raw).unwrap();
/// assert_eq!(region.content, "b=2");
/// ```
pub fn find_managed_region(raw: &str) -> Option<ManagedRegion<'_>> {
    let start = raw.find(CONTENT_START)?;
    let end_marker = raw.find(CONTENT_END)?;
    if end_marker <= start {
        tracing::warn!("Closing marker precedes opening marker, treating file as unmanaged");
        return None;
    }

    let inner = &raw[start + CONTENT_START.len()..end_marker];
    Some(ManagedRegion {
        start,
        end: end_marker + CONTENT_END.len(),
        content: inner.trim_matches(['\n', '\r']),
    })
}

/// Whether `raw` currently carries a managed region.
pub fn has_managed_region(raw: &str) -> bool {
    find_managed_region(raw).is_some()
}

/// Everything in `raw` that the manager does not own.
///
/// With a managed region present, this is the text before the opening
/// sentinel joined with any text after the closing sentinel, so content
/// appended below the block by someone else survives. Without one, the whole
/// file is external. Trailing whitespace is trimmed in both cases.
pub fn extract_external_region(raw: &str) -> String {
    match find_managed_region(raw) {
        Some(region) => {
            let mut external = String::with_capacity(raw.len());
            external.push_str(&raw[..region.start]);
            external.push_str(&raw[region.end..]);
            external.truncate(external.trim_end().len());
            external
        }
        None => raw.trim_end().to_string(),
    }
}
