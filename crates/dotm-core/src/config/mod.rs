//! Settings and their layered resolution.

mod resolver;
mod settings;

pub use resolver::{GLOBAL_CONFIG_DIR_NAME, SettingsResolver};
pub use settings::{DEFAULT_HISTORY_LIMIT, DEFAULT_REFRESH_CHECK_SECS, Settings, WriteMode};
