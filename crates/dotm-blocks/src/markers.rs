//! Sentinel lines bounding the managed region.

/// Opening sentinel of the managed region.
pub const CONTENT_START: &str = "# --- DOTFILE_MANAGER_CONTENT_START ---";

/// Closing sentinel of the managed region.
pub const CONTENT_END: &str = "# --- DOTFILE_MANAGER_CONTENT_END ---";
