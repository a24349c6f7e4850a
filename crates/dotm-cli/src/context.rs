//! Locating the data directory and opening the manager

use std::path::Path;

use dotm_core::DotfileManager;
use dotm_fs::DataLayout;

use crate::error::Result;

/// Open the manager over `data_dir`, or the default data directory.
pub fn open_manager(data_dir: Option<&Path>) -> Result<DotfileManager> {
    let layout = match data_dir {
        Some(dir) => DataLayout::new(dir),
        None => DataLayout::from_env()?,
    };
    tracing::debug!(data_dir = ?layout.root(), "Opening data directory");
    Ok(DotfileManager::open(layout)?)
}
