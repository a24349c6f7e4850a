//! Shared test utilities for the dotfile manager workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`home`]: [`TestHome`] sandbox with a fake home and data directory
//! - [`fixtures`]: persisted tree documents for common layouts

pub mod fixtures;
pub mod home;

pub use home::TestHome;
