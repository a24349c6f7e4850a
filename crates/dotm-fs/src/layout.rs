//! Data directory layout

use std::path::{Path, PathBuf};

use crate::{DataPath, Error, Result};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "DOTM_DATA_DIR";

/// Directory name used under the home directory by default.
const DEFAULT_DIR_NAME: &str = ".dotfile-manager";

/// Where the manager keeps its tree, content blobs, history and settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    /// Use an explicit data directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the data directory from `DOTM_DATA_DIR`, falling back to
    /// `~/.dotfile-manager`.
    pub fn from_env() -> Result<Self> {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(Self::new(dir));
        }
        let home = dirs::home_dir().ok_or(Error::NoHomeDir)?;
        Ok(Self::new(home.join(DEFAULT_DIR_NAME)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, entry: DataPath) -> PathBuf {
        self.root.join(entry)
    }

    pub fn tree_file(&self) -> PathBuf {
        self.path(DataPath::TreeFile)
    }

    pub fn history_file(&self) -> PathBuf {
        self.path(DataPath::HistoryFile)
    }

    pub fn content_dir(&self) -> PathBuf {
        self.path(DataPath::ContentDir)
    }

    pub fn config_file(&self) -> PathBuf {
        self.path(DataPath::ConfigFile)
    }

    pub fn local_config_file(&self) -> PathBuf {
        self.path(DataPath::LocalConfigFile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_live_under_root() {
        let layout = DataLayout::new("/data");
        assert_eq!(layout.tree_file(), PathBuf::from("/data/tree.json"));
        assert_eq!(layout.history_file(), PathBuf::from("/data/history.json"));
        assert_eq!(layout.content_dir(), PathBuf::from("/data/content"));
        assert_eq!(layout.config_file(), PathBuf::from("/data/config.toml"));
        assert_eq!(
            layout.local_config_file(),
            PathBuf::from("/data/config.local.toml")
        );
    }
}
