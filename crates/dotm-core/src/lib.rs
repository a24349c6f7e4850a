//! Core of the dotfile manager
//!
//! - **Tree**: the configuration forest and the enable/disable cascade
//! - **Trashcan**: soft deletion and restore of subtrees
//! - **Aggregation**: which fragments feed which target, text join or JSON
//!   deep merge
//! - **Write pipeline**: managed-region placement, no-op detection,
//!   permission escalation, history and notification
//! - **Remote refresh**: fetching remote items on demand or on a schedule
//!
//! # Architecture
//!
//! ```text
//!                 dotm-cli / host
//!                       |
//!                  DotfileManager
//!                       |
//!   +---------+---------+---------+----------+
//!   |         |         |         |          |
//!  tree   aggregate   sync     history    remote
//!                       |
//!            +----------+----------+
//!            |                     |
//!         dotm-fs             dotm-blocks
//! ```

pub mod aggregate;
pub mod config;
pub mod elevation;
pub mod error;
pub mod history;
pub mod hooks;
pub mod manager;
pub mod notify;
pub mod remote;
pub mod store;
pub mod sync;
pub mod trashcan;
pub mod tree;

pub use aggregate::{ContentAggregator, ManagedFile};
pub use config::{Settings, SettingsResolver, WriteMode};
pub use elevation::{Credential, ElevationSession, PrivilegedWriter, SudoWriter};
pub use error::{Error, Result};
pub use history::{FileHistory, HistorySnapshot, HistoryStore, InMemoryHistory};
pub use hooks::PostWriteHook;
pub use manager::{DotfileManager, RemovalReport};
pub use notify::{ChannelNotifier, Event, Notifier, TracingNotifier};
pub use remote::{Fetcher, HttpFetcher, RefreshScheduler, needs_refresh};
pub use store::{ContentStore, FileContentStore, MemoryContentStore, TreeDocument, TreeStore};
pub use sync::{FileSync, SyncFailure, SyncOrchestrator, SyncReport, WriteOptions, WriteOutcome};
pub use trashcan::{Trashcan, TrashcanEntry, move_to_trashcan, restore_from_trashcan};
pub use tree::{ConfigItem, FolderMode, ItemKind, ItemPatch};
