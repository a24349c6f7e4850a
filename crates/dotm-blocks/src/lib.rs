//! Managed-region partitioning for dotfiles.
//!
//! The manager never owns a whole dotfile. It owns one region bounded by two
//! sentinel lines and leaves everything else (the *external region*) to the
//! file's owner:
//!
//! ```text
//! export EDITOR=vim            <- external region
//!
//! # --- DOTFILE_MANAGER_CONTENT_START ---
//!
//! alias ll='ls -la'            <- managed region
//!
//! # --- DOTFILE_MANAGER_CONTENT_END ---
//! ```
//!
//! Everything here is a pure text transform. There is no escaping: if a
//! fragment itself contains a sentinel line the result is unspecified.

pub mod markers;
pub mod parser;
pub mod writer;

pub use markers::{CONTENT_END, CONTENT_START};
pub use parser::{ManagedRegion, extract_external_region, find_managed_region, has_managed_region};
pub use writer::{build_append, build_overwrite};
