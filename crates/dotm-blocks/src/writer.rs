//! Building the file content that gets written to disk.

use crate::markers::{CONTENT_END, CONTENT_START};
use crate::parser::extract_external_region;

/// Content for overwrite mode: exactly `content`, no sentinels.
///
/// Used when the manager hands the whole file back to its owner.
pub fn build_overwrite(content: &str) -> String {
    content.to_string()
}

/// Content for append mode: the external region of `raw` followed by a
/// managed region holding `content`.
///
/// Blank `content` yields the external region alone, which is how disabling
/// every contributing item removes a previously written block. An empty
/// external region is omitted so the file does not start with a blank line.
///
/// # Example
/// ```
/// use dotm_blocks::writer::build_append;
///
/// let out = build_append("", "PATH=/usr/bin");
/// assert_eq!(
///     out,
///     "# --- DOTFILE_MANAGER_CONTENT_START ---\n\nPATH=/usr/bin\n\n# --- DOTFILE_MANAGER_CONTENT_END ---"
/// );
/// ```
pub fn build_append(raw: &str, content: &str) -> String {
    let external = extract_external_region(raw);

    if content.trim().is_empty() {
        return external;
    }

    let block = format!("{CONTENT_START}\n\n{content}\n\n{CONTENT_END}");
    if external.is_empty() {
        block
    } else {
        format!("{external}\n\n{block}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn append_to_empty_file() {
        assert_eq!(
            build_append("", "PATH=/usr/bin"),
            format!("{CONTENT_START}\n\nPATH=/usr/bin\n\n{CONTENT_END}")
        );
    }

    #[test]
    fn append_to_unmanaged_file_keeps_it_first() {
        assert_eq!(
            build_append("export A=1\n", "alias g=git"),
            format!("export A=1\n\n{CONTENT_START}\n\nalias g=git\n\n{CONTENT_END}")
        );
    }

    #[test]
    fn append_replaces_existing_block() {
        let first = build_append("export A=1", "old");
        let second = build_append(&first, "new");
        assert_eq!(
            second,
            format!("export A=1\n\n{CONTENT_START}\n\nnew\n\n{CONTENT_END}")
        );
    }

    #[test]
    fn blank_content_removes_block() {
        let written = build_append("export A=1", "alias g=git");
        assert_eq!(build_append(&written, "  \n"), "export A=1");
        assert_eq!(build_append(&written, ""), "export A=1");
    }

    #[test]
    fn overwrite_is_verbatim() {
        assert_eq!(build_overwrite("a\n\nb\n"), "a\n\nb\n");
        assert_eq!(build_overwrite(""), "");
    }
}
