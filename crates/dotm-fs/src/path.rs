//! Target path resolution
//!
//! Dotfile paths are stored the way the user typed them (`~/.zshrc`,
//! `.config/app.json`, `/etc/hosts`) and resolved to absolute paths only at
//! the I/O boundary.

use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// Resolve a stored dotfile path to an absolute path.
///
/// - A leading `~` is replaced with the home directory when it stands alone
///   or is followed by a separator. `~user` forms are left as they are.
/// - Relative paths are resolved against the current working directory.
/// - Absolute paths pass through unchanged.
///
/// # Errors
///
/// Returns [`Error::NoHomeDir`] when the path starts with `~` and the home
/// directory cannot be determined, or an I/O error when the working
/// directory is unavailable.
pub fn resolve_path(file_path: &str) -> Result<PathBuf> {
    let tilde = home_relative(file_path).is_some();
    let home = if tilde {
        Some(dirs::home_dir().ok_or(Error::NoHomeDir)?)
    } else {
        None
    };
    let cwd = if !tilde && !Path::new(file_path).is_absolute() {
        Some(std::env::current_dir().map_err(|e| Error::io(".", e))?)
    } else {
        None
    };

    resolve_path_with(file_path, home.as_deref(), cwd.as_deref())
}

/// Resolve a stored dotfile path against an explicit home and working
/// directory.
///
/// This is the pure core of [`resolve_path`].
pub fn resolve_path_with(
    file_path: &str,
    home: Option<&Path>,
    cwd: Option<&Path>,
) -> Result<PathBuf> {
    if let Some(rest) = home_relative(file_path) {
        let home = home.ok_or(Error::NoHomeDir)?;
        let rest = rest.trim_start_matches(['/', '\\']);
        if rest.is_empty() {
            return Ok(home.to_path_buf());
        }
        return Ok(clean(&home.join(rest)));
    }

    let path = Path::new(file_path);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    let cwd = cwd.ok_or_else(|| {
        Error::io(
            file_path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "no working directory"),
        )
    })?;
    Ok(clean(&cwd.join(path)))
}

/// The part after a leading `~` that refers to the current user's home.
fn home_relative(file_path: &str) -> Option<&str> {
    let rest = file_path.strip_prefix('~')?;
    (rest.is_empty() || rest.starts_with(['/', '\\'])).then_some(rest)
}

/// Lexically normalize `.` and `..` components.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` above the root stays at the root
                if !out.pop() && !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Whether a target path should be merged as JSON.
pub fn is_json_path(file_path: &str) -> bool {
    Path::new(file_path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Validate that a string is safe to use as a single file name component.
///
/// Item ids become file names in the content store, so they must not be able
/// to escape it.
pub fn validate_path_identifier(value: &str, label: &str) -> std::result::Result<(), String> {
    if value.is_empty() {
        return Err(format!("{label} must not be empty"));
    }
    if value.contains(['/', '\\', '\0']) {
        return Err(format!("{label} contains a path separator: {value:?}"));
    }
    if value.starts_with('.') {
        return Err(format!("{label} must not start with '.': {value:?}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const HOME: &str = "/home/alice";
    const CWD: &str = "/work/dir";

    fn resolve(p: &str) -> PathBuf {
        resolve_path_with(p, Some(Path::new(HOME)), Some(Path::new(CWD))).unwrap()
    }

    #[rstest]
    #[case("~/.zshrc", "/home/alice/.zshrc")]
    #[case("~", "/home/alice")]
    #[case("~/.config/app/settings.json", "/home/alice/.config/app/settings.json")]
    #[case("/etc/hosts", "/etc/hosts")]
    #[case(".gitconfig", "/work/dir/.gitconfig")]
    #[case("../other/.vimrc", "/work/other/.vimrc")]
    #[case("./a/./b", "/work/dir/a/b")]
    #[case("~alice/.vimrc", "/work/dir/~alice/.vimrc")]
    #[case("~~", "/work/dir/~~")]
    fn resolves_paths(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(resolve(input), PathBuf::from(expected));
    }

    #[test]
    fn absolute_path_passes_through_untouched() {
        // No normalization for absolute paths
        assert_eq!(resolve("/etc/../etc/hosts"), PathBuf::from("/etc/../etc/hosts"));
    }

    #[test]
    fn tilde_without_home_fails() {
        let err = resolve_path_with("~/.zshrc", None, None).unwrap_err();
        assert!(matches!(err, Error::NoHomeDir));
    }

    #[rstest]
    #[case("settings.json", true)]
    #[case("~/.config/Code/User/settings.JSON", true)]
    #[case("~/.zshrc", false)]
    #[case("json", false)]
    #[case("~/.json", false)]
    fn detects_json_targets(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(is_json_path(path), expected);
    }

    #[test]
    fn identifier_validation() {
        assert!(validate_path_identifier("abc-123", "Item id").is_ok());
        assert!(validate_path_identifier("0-default", "Item id").is_ok());
        assert!(validate_path_identifier("", "Item id").is_err());
        assert!(validate_path_identifier("../etc", "Item id").is_err());
        assert!(validate_path_identifier("a/b", "Item id").is_err());
        assert!(validate_path_identifier(".hidden", "Item id").is_err());
    }
}
