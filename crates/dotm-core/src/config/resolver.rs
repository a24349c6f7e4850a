//! Layered settings resolution
//!
//! Later layers override earlier ones key by key; missing files are skipped.

use std::fs;
use std::path::PathBuf;

use dotm_fs::DataLayout;
use serde_json::{Map, Value};

use super::Settings;
use crate::Result;
use crate::aggregate::deep_merge;

/// Directory name under the platform config dir holding global settings.
pub const GLOBAL_CONFIG_DIR_NAME: &str = "dotfile-manager";

/// Resolves [`Settings`] from:
/// 1. Global settings (`<config_dir>/dotfile-manager/config.toml`)
/// 2. Data-dir settings (`<data>/config.toml`)
/// 3. Machine-local overrides (`<data>/config.local.toml`)
pub struct SettingsResolver {
    layout: DataLayout,

    /// Override for the global config directory (used for testing).
    /// When `None`, `dirs::config_dir()` is used.
    global_config_dir_override: Option<PathBuf>,
}

impl SettingsResolver {
    pub fn new(layout: DataLayout) -> Self {
        Self {
            layout,
            global_config_dir_override: None,
        }
    }

    /// Create a resolver with a custom global config directory.
    pub fn with_global_config_dir(layout: DataLayout, global_config_dir: PathBuf) -> Self {
        Self {
            layout,
            global_config_dir_override: Some(global_config_dir),
        }
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref override_dir) = self.global_config_dir_override {
            return Some(override_dir.clone());
        }
        dirs::config_dir().map(|d| d.join(GLOBAL_CONFIG_DIR_NAME))
    }

    /// Candidate layer files, lowest precedence first.
    pub fn layer_paths(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(global_dir) = self.global_config_dir() {
            paths.push(global_dir.join("config.toml"));
        }
        paths.push(self.layout.config_file());
        paths.push(self.layout.local_config_file());
        paths
    }

    /// Merge every present layer over the defaults.
    ///
    /// Invalid TOML in any layer is an error.
    pub fn resolve(&self) -> Result<Settings> {
        let mut merged = Value::Object(Map::new());

        for (layer, path) in self.layer_paths().into_iter().enumerate() {
            if !path.is_file() {
                tracing::debug!(?path, layer = layer + 1, "No settings layer, skipping");
                continue;
            }
            tracing::debug!(?path, layer = layer + 1, "Loading settings layer");
            let content = fs::read_to_string(&path)?;
            let value: Value = toml::from_str(&content)?;
            deep_merge(&mut merged, &value);
        }

        Ok(serde_json::from_value(merged)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WriteMode;
    use crate::tree::FolderMode;
    use tempfile::TempDir;

    fn resolver(temp: &TempDir) -> SettingsResolver {
        SettingsResolver::with_global_config_dir(
            DataLayout::new(temp.path().join("data")),
            temp.path().join("global"),
        )
    }

    #[test]
    fn no_layers_yields_defaults() {
        let temp = TempDir::new().unwrap();
        assert_eq!(resolver(&temp).resolve().unwrap(), Settings::default());
    }

    #[test]
    fn later_layers_override_earlier() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("global")).unwrap();
        fs::create_dir_all(temp.path().join("data")).unwrap();
        fs::write(
            temp.path().join("global/config.toml"),
            "history_limit = 10\ncascade_all = true\n",
        )
        .unwrap();
        fs::write(
            temp.path().join("data/config.toml"),
            "write_mode = \"overwrite\"\nhistory_limit = 20\n\n[post_write_hook]\ncommand = \"true\"\n",
        )
        .unwrap();
        fs::write(
            temp.path().join("data/config.local.toml"),
            "choice_mode = 1\n\n[post_write_hook]\nargs = [\"${FILE_PATH}\"]\n",
        )
        .unwrap();

        let settings = resolver(&temp).resolve().unwrap();
        assert_eq!(settings.history_limit, 20);
        assert!(settings.cascade_all);
        assert_eq!(settings.write_mode, WriteMode::Overwrite);
        assert_eq!(settings.choice_mode, FolderMode::Single);
        let hook = settings.post_write_hook.unwrap();
        assert_eq!(hook.command, "true");
        assert_eq!(hook.args, ["${FILE_PATH}"]);
    }

    #[test]
    fn invalid_layer_is_an_error() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("data")).unwrap();
        fs::write(temp.path().join("data/config.toml"), "write_mode = [").unwrap();
        assert!(resolver(&temp).resolve().is_err());
    }
}
