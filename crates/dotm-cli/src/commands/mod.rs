//! Command implementations for dotm-cli

pub mod items;
pub mod remote;
pub mod sync;
pub mod trash;

pub use items::{run_add, run_edit, run_list, run_show, run_toggle, AddArgs, EditArgs};
pub use remote::{run_refresh, run_watch};
pub use sync::{run_history, run_remove_management, run_sync};
pub use trash::{run_purge, run_restore, run_trash};
