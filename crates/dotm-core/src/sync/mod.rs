//! Write pipeline and synchronization
//!
//! [`FileSync`] writes one target; [`SyncOrchestrator`] fans a full pass out
//! over every managed target.

mod file_sync;
mod orchestrator;

pub use file_sync::{FileSync, WriteOptions, WriteOutcome};
pub use orchestrator::{SyncFailure, SyncOrchestrator, SyncReport};
