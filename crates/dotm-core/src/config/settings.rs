//! Settings consumed by the write pipeline and the tree engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::hooks::PostWriteHook;
use crate::tree::FolderMode;

/// Snapshots kept per target by default.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Seconds between scheduled refresh checks by default.
pub const DEFAULT_REFRESH_CHECK_SECS: u64 = 60;

/// How aggregated content is placed into a target file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Keep the file's own content and own only the managed region
    #[default]
    Append,
    /// Replace the whole file
    Overwrite,
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Append => write!(f, "append"),
            Self::Overwrite => write!(f, "overwrite"),
        }
    }
}

impl FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "append" => Ok(Self::Append),
            "overwrite" => Ok(Self::Overwrite),
            other => Err(format!(
                "invalid write mode '{other}', expected 'append' or 'overwrite'"
            )),
        }
    }
}

/// Effective settings after merging every layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub write_mode: WriteMode,
    /// Snapshots kept per target, `0` keeps everything
    pub history_limit: usize,
    /// Choice mode of the top level and of folders without their own
    pub choice_mode: FolderMode,
    /// Propagate toggles through folder subtrees and ancestors
    pub cascade_all: bool,
    pub refresh_check_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_write_hook: Option<PostWriteHook>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            write_mode: WriteMode::Append,
            history_limit: DEFAULT_HISTORY_LIMIT,
            choice_mode: FolderMode::Default,
            cascade_all: false,
            refresh_check_secs: DEFAULT_REFRESH_CHECK_SECS,
            post_write_hook: None,
        }
    }
}
