//! Filesystem primitives for the dotfile manager
//!
//! Provides target path resolution, content checksums, atomic writes for the
//! manager's own data files, and the on-disk layout of the data directory.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod layout;
pub mod path;

pub use checksum::compute_content_checksum;
pub use config::ConfigStore;
pub use constants::DataPath;
pub use error::{Error, Result};
pub use layout::DataLayout;
pub use path::{is_json_path, resolve_path, resolve_path_with, validate_path_identifier};
