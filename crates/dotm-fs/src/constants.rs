//! Names of the files kept in the data directory.

use std::path::Path;

/// Standard entries of the manager's data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataPath {
    /// Live tree and trashcan
    TreeFile,
    /// Per-path write history
    HistoryFile,
    /// One blob per item id
    ContentDir,
    /// Shared settings
    ConfigFile,
    /// Machine-local settings overrides
    LocalConfigFile,
}

impl DataPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TreeFile => "tree.json",
            Self::HistoryFile => "history.json",
            Self::ContentDir => "content",
            Self::ConfigFile => "config.toml",
            Self::LocalConfigFile => "config.local.toml",
        }
    }
}

impl AsRef<Path> for DataPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl std::fmt::Display for DataPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
