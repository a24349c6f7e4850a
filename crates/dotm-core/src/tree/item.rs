//! Configuration items as persisted in the tree.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Id of the top-level system root, which can never be removed.
pub const SYSTEM_ROOT_ID: &str = "0";

/// Suffix of synthetic default item ids.
pub const DEFAULT_ID_SUFFIX: &str = "-default";

/// Title given to materialized default items.
pub const DEFAULT_ITEM_TITLE: &str = "System Default Config";

/// Id of the default item owned by `parent_id`.
pub fn default_item_id(parent_id: &str) -> String {
    format!("{parent_id}{DEFAULT_ID_SUFFIX}")
}

/// Whether `id` names a synthetic default item.
pub fn is_default_id(id: &str) -> bool {
    id.ends_with(DEFAULT_ID_SUFFIX)
}

/// What an item is and where its content comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Content edited locally and stored by id
    #[default]
    Local,
    /// Content fetched from a URL
    Remote,
    /// Concatenation of other items listed in `include`
    Group,
    /// Container of other items
    Folder,
    /// Container bound to one real file on disk
    SystemFile,
}

impl ItemKind {
    /// Folder and system-file nodes hold children instead of content.
    pub fn is_container(self) -> bool {
        matches!(self, Self::Folder | Self::SystemFile)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
            Self::Group => write!(f, "group"),
            Self::Folder => write!(f, "folder"),
            Self::SystemFile => write!(f, "system_file"),
        }
    }
}

/// Choice mode of a sibling group.
///
/// Persisted as `0` (inherit the global default), `1` (single) or `2` (multi).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FolderMode {
    #[default]
    Default,
    Single,
    Multi,
}

impl FolderMode {
    pub fn is_default(&self) -> bool {
        *self == Self::Default
    }

    /// The effective mode, falling back to `global` when unset.
    pub fn or(self, global: FolderMode) -> FolderMode {
        match self {
            Self::Default => global,
            other => other,
        }
    }
}

impl TryFrom<u8> for FolderMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Default),
            1 => Ok(Self::Single),
            2 => Ok(Self::Multi),
            other => Err(format!("invalid folder mode {other}, expected 0, 1 or 2")),
        }
    }
}

impl From<FolderMode> for u8 {
    fn from(mode: FolderMode) -> Self {
        match mode {
            FolderMode::Default => 0,
            FolderMode::Single => 1,
            FolderMode::Multi => 2,
        }
    }
}

/// A node of the configuration forest.
///
/// Local and remote content is not stored here; it lives in a content store
/// keyed by `id`. Containers always persist `children` and groups always
/// persist `include`, even when empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfigItem {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(rename = "on", default)]
    pub enabled: bool,

    #[serde(rename = "type", default)]
    pub kind: ItemKind,

    #[serde(default)]
    pub file_path: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    /// Local wall-clock time of the last refresh, `YYYY-MM-DD HH:MM:SS`
    #[serde(default)]
    pub last_refresh: Option<String>,

    #[serde(default)]
    pub last_refresh_ms: Option<i64>,

    /// Seconds between scheduled refreshes, `0` or absent disables them
    #[serde(default)]
    pub refresh_interval: Option<u64>,

    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub folder_mode: FolderMode,

    #[serde(default)]
    pub folder_open: bool,

    #[serde(default)]
    pub children: Vec<ConfigItem>,
}

/// Borrowed persisted form of a [`ConfigItem`].
#[derive(Serialize)]
struct PersistedItem<'a> {
    id: &'a str,
    title: &'a str,
    on: bool,
    #[serde(rename = "type")]
    kind: ItemKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_path: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_refresh: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_refresh_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_interval: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    include: Option<&'a [String]>,
    #[serde(skip_serializing_if = "FolderMode::is_default")]
    folder_mode: FolderMode,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    folder_open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<&'a [ConfigItem]>,
}

impl Serialize for ConfigItem {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let keep_include = self.kind == ItemKind::Group || !self.include.is_empty();
        let keep_children = self.kind.is_container() || !self.children.is_empty();
        PersistedItem {
            id: &self.id,
            title: &self.title,
            on: self.enabled,
            kind: self.kind,
            file_path: self.file_path.as_deref(),
            url: self.url.as_deref(),
            last_refresh: self.last_refresh.as_deref(),
            last_refresh_ms: self.last_refresh_ms,
            refresh_interval: self.refresh_interval,
            include: keep_include.then_some(self.include.as_slice()),
            folder_mode: self.folder_mode,
            folder_open: self.folder_open,
            children: keep_children.then_some(self.children.as_slice()),
        }
        .serialize(serializer)
    }
}

impl ConfigItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn local(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(id, title, ItemKind::Local)
    }

    pub fn folder(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(id, title, ItemKind::Folder)
    }

    pub fn system_file(
        id: impl Into<String>,
        title: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        Self::new(id, title, ItemKind::SystemFile).with_file_path(file_path)
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_file_path(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    pub fn with_mode(mut self, mode: FolderMode) -> Self {
        self.folder_mode = mode;
        self
    }

    pub fn with_children(mut self, children: Vec<ConfigItem>) -> Self {
        self.children = children;
        self
    }

    pub fn with_include<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_refresh_interval(mut self, secs: u64) -> Self {
        self.refresh_interval = Some(secs);
        self
    }

    /// Whether this is a synthetic default item.
    pub fn is_default_item(&self) -> bool {
        is_default_id(&self.id)
    }

    /// The non-empty target path bound to this item, if any.
    pub fn target_path(&self) -> Option<&str> {
        self.file_path.as_deref().filter(|p| !p.trim().is_empty())
    }

    /// Whether this is a container bound to a target file.
    pub fn owns_target(&self) -> bool {
        self.kind.is_container() && self.target_path().is_some()
    }
}

/// Shallow update applied by [`update`](super::ops::update).
///
/// Fields left as `None` are untouched. For optional item fields the inner
/// `Option` is the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub enabled: Option<bool>,
    pub kind: Option<ItemKind>,
    pub file_path: Option<Option<String>>,
    pub url: Option<Option<String>>,
    pub last_refresh: Option<Option<String>>,
    pub last_refresh_ms: Option<Option<i64>>,
    pub refresh_interval: Option<Option<u64>>,
    pub include: Option<Vec<String>>,
    pub folder_mode: Option<FolderMode>,
    pub folder_open: Option<bool>,
    pub children: Option<Vec<ConfigItem>>,
}

impl ItemPatch {
    /// Copy every set field onto `item`.
    pub fn apply(&self, item: &mut ConfigItem) {
        if let Some(title) = &self.title {
            item.title = title.clone();
        }
        if let Some(enabled) = self.enabled {
            item.enabled = enabled;
        }
        if let Some(kind) = self.kind {
            item.kind = kind;
        }
        if let Some(file_path) = &self.file_path {
            item.file_path = file_path.clone();
        }
        if let Some(url) = &self.url {
            item.url = url.clone();
        }
        if let Some(last_refresh) = &self.last_refresh {
            item.last_refresh = last_refresh.clone();
        }
        if let Some(last_refresh_ms) = self.last_refresh_ms {
            item.last_refresh_ms = last_refresh_ms;
        }
        if let Some(refresh_interval) = self.refresh_interval {
            item.refresh_interval = refresh_interval;
        }
        if let Some(include) = &self.include {
            item.include = include.clone();
        }
        if let Some(folder_mode) = self.folder_mode {
            item.folder_mode = folder_mode;
        }
        if let Some(folder_open) = self.folder_open {
            item.folder_open = folder_open;
        }
        if let Some(children) = &self.children {
            item.children = children.clone();
        }
    }
}
