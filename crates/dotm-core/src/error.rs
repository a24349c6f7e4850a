//! Error types for dotm-core

use std::path::PathBuf;

/// Result type for dotm-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in dotm-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The target is not writable and no elevated credential is available
    #[error("No permission to write {path}, an elevated credential is required")]
    NoAccess { path: PathBuf },

    /// The privileged helper ran and failed
    #[error("Privileged write to {path} failed: {message}")]
    ElevationFailed { path: PathBuf, message: String },

    /// No item with this id exists
    #[error("Invalid item id: {id}")]
    InvalidId { id: String },

    /// The item exists but is not a remote item
    #[error("Item {id} is not a remote item")]
    NotRemote { id: String },

    /// A remote item has no usable URL
    #[error("Remote item {id} has no URL")]
    NoUrl { id: String },

    /// An id is already used in the tree or trashcan
    #[error("Duplicate item id: {id}")]
    DuplicateId { id: String },

    /// Operation refused for this kind of item
    #[error("Operation not allowed on {id}: {reason}")]
    NotAllowed { id: String, reason: String },

    /// Fetching remote content failed
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    // Transparent wrappers for underlying errors
    /// Filesystem error from dotm-fs
    #[error(transparent)]
    Fs(#[from] dotm_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    /// Machine-readable code for callers across the process boundary.
    ///
    /// `no_access` tells the caller to obtain an elevated credential and retry.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoAccess { .. } | Self::ElevationFailed { .. } => "no_access",
            Self::InvalidId { .. } => "invalid_id",
            Self::NotRemote { .. } => "not_remote",
            Self::NoUrl { .. } => "no_url",
            Self::NotFound(_) => "not_found",
            Self::Fs(e) if e.is_permission_denied() => "no_access",
            Self::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => "no_access",
            _ => "fail",
        }
    }

    /// Whether the caller should prompt for a credential.
    pub fn is_no_access(&self) -> bool {
        self.code() == "no_access"
    }
}
