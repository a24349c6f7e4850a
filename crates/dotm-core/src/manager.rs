//! The host-facing facade over the tree, the stores and the write pipeline.
//!
//! Every mutation loads the tree document, applies a copy-based operation
//! and saves it back. Mutations are expected to be serialized by the host.

use std::path::PathBuf;
use std::sync::Arc;

use dotm_fs::{DataLayout, validate_path_identifier};

use crate::aggregate::{ContentAggregator, ManagedFile};
use crate::config::{Settings, SettingsResolver};
use crate::elevation::{ElevationSession, PrivilegedWriter, SudoWriter};
use crate::history::{FileHistory, HistorySnapshot, HistoryStore};
use crate::notify::{Event, Notifier, TracingNotifier};
use crate::remote::{Fetcher, HttpFetcher, LAST_REFRESH_FORMAT};
use crate::store::{ContentStore, FileContentStore, TreeDocument, TreeStore};
use crate::sync::{FileSync, SyncOrchestrator, SyncReport, WriteOptions};
use crate::trashcan::{move_to_trashcan, restore_from_trashcan};
use crate::tree::{
    self, ConfigItem, ItemKind, ItemPatch, collect_ids, default_item_id, find, set_enabled,
};
use crate::{Error, Result};

/// Outcome of removing management from a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalReport {
    /// Whether the tree entry was removed
    pub removed: bool,
    /// Whether the target got its original content back
    pub restored: bool,
    /// Why restoration failed, when it did
    pub warning: Option<String>,
}

pub struct DotfileManager {
    layout: DataLayout,
    settings: Settings,
    tree_store: TreeStore,
    content: Arc<dyn ContentStore>,
    history: Arc<dyn HistoryStore>,
    notifier: Arc<dyn Notifier>,
    fetcher: Arc<dyn Fetcher>,
    privileged: Arc<dyn PrivilegedWriter>,
    session: Arc<ElevationSession>,
    home_dir: Option<PathBuf>,
}

impl DotfileManager {
    /// Open the data directory, resolving settings from every layer.
    pub fn open(layout: DataLayout) -> Result<Self> {
        let settings = SettingsResolver::new(layout.clone()).resolve()?;
        Ok(Self::new(layout, settings))
    }

    /// File-backed stores under `layout` with explicit settings.
    pub fn new(layout: DataLayout, settings: Settings) -> Self {
        Self {
            tree_store: TreeStore::new(layout.tree_file()),
            content: Arc::new(FileContentStore::new(layout.content_dir())),
            history: Arc::new(FileHistory::new(layout.history_file())),
            notifier: Arc::new(TracingNotifier),
            fetcher: Arc::new(HttpFetcher::new()),
            privileged: Arc::new(SudoWriter::new()),
            session: Arc::new(ElevationSession::new()),
            home_dir: None,
            layout,
            settings,
        }
    }

    pub fn with_content_store(mut self, store: Arc<dyn ContentStore>) -> Self {
        self.content = store;
        self
    }

    pub fn with_history(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = history;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_privileged_writer(mut self, writer: Arc<dyn PrivilegedWriter>) -> Self {
        self.privileged = writer;
        self
    }

    pub fn with_session(mut self, session: Arc<ElevationSession>) -> Self {
        self.session = session;
        self
    }

    /// Resolve `~` in target paths against `home`.
    pub fn with_home_dir(mut self, home: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(home.into());
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    pub fn session(&self) -> &ElevationSession {
        &self.session
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn content_store(&self) -> &dyn ContentStore {
        self.content.as_ref()
    }

    /// A write pipeline sharing this manager's stores and session.
    pub fn file_sync(&self) -> FileSync {
        let sync = FileSync::new(
            self.settings.clone(),
            self.history.clone(),
            self.notifier.clone(),
        )
        .with_privileged_writer(self.privileged.clone())
        .with_session(self.session.clone());
        match &self.home_dir {
            Some(home) => sync.with_home_dir(home.clone()),
            None => sync,
        }
    }

    pub fn list(&self) -> Result<TreeDocument> {
        self.tree_store.load()
    }

    fn save(&self, doc: &mut TreeDocument) -> Result<()> {
        self.tree_store.save(doc)
    }

    pub fn find_item(&self, id: &str) -> Result<Option<ConfigItem>> {
        Ok(find(&self.list()?.list, id).cloned())
    }

    /// Add an item, optionally storing its content. Returns its id.
    pub fn add_item(
        &self,
        parent_id: Option<&str>,
        item: ConfigItem,
        content: Option<&str>,
    ) -> Result<String> {
        for id in collect_ids(&item).iter().filter(|id| !id.is_empty()) {
            validate_path_identifier(id, "Item id").map_err(dotm_fs::Error::InvalidIdentifier)?;
        }
        if content.is_some() && !matches!(item.kind, ItemKind::Local | ItemKind::Remote) {
            return Err(Error::NotAllowed {
                id: item.id.clone(),
                reason: format!("a {} item has no content of its own", item.kind),
            });
        }

        let mut doc = self.list()?;
        let taken = doc.trashcan.ids();
        let list = tree::add_item(&doc.list, parent_id, item, &taken)?;
        // The new item is the last one added under its parent
        let id = match parent_id {
            None => list.last(),
            Some(pid) => find(&list, pid).and_then(|p| p.children.last()),
        }
        .map(|i| i.id.clone())
        .ok_or_else(|| Error::NotFound("added item".to_string()))?;

        doc.list = list;
        self.save(&mut doc)?;
        if let Some(content) = content {
            self.content.set(&id, content)?;
        }

        tracing::info!(id = %id, ?parent_id, "Added item");
        self.notifier.notify(Event::ListReloaded);
        Ok(id)
    }

    /// Shallow-update an item. Returns `false` for an unknown id.
    pub fn update_item(&self, id: &str, patch: &ItemPatch) -> Result<bool> {
        let mut doc = self.list()?;
        if find(&doc.list, id).is_none() {
            return Ok(false);
        }
        doc.list = tree::update(&doc.list, id, patch);
        self.save(&mut doc)?;
        self.notifier.notify(Event::ListReloaded);
        Ok(true)
    }

    /// Replace the stored content of a local or remote item.
    pub fn set_content(&self, id: &str, content: &str) -> Result<bool> {
        let doc = self.list()?;
        let Some(item) = find(&doc.list, id) else {
            return Ok(false);
        };
        if !matches!(item.kind, ItemKind::Local | ItemKind::Remote) {
            return Err(Error::NotAllowed {
                id: id.to_string(),
                reason: format!("a {} item has no content of its own", item.kind),
            });
        }
        self.content.set(id, content)?;
        self.notifier.notify(Event::ContentChanged { id: id.to_string() });
        Ok(true)
    }

    /// Display content of an item, `None` for an unknown id.
    pub fn item_content(&self, id: &str) -> Result<Option<String>> {
        let doc = self.list()?;
        if find(&doc.list, id).is_none() {
            return Ok(None);
        }
        let aggregator = ContentAggregator::new(self.content.as_ref(), self.settings.cascade_all);
        Ok(Some(aggregator.resolve_item_content(&doc.list, id)))
    }

    /// Switch an item on or off with the configured choice and cascade
    /// settings. Returns `false` for an unknown id.
    pub fn toggle(&self, id: &str, enabled: bool) -> Result<bool> {
        let mut doc = self.list()?;
        if find(&doc.list, id).is_none() {
            return Ok(false);
        }
        doc.list = set_enabled(
            &doc.list,
            id,
            enabled,
            self.settings.choice_mode,
            self.settings.cascade_all,
        );
        self.save(&mut doc)?;
        tracing::info!(id, enabled, "Toggled item");
        self.notifier.notify(Event::ListReloaded);
        Ok(true)
    }

    /// Aggregated content of every managed target.
    pub fn managed_files(&self) -> Result<Vec<ManagedFile>> {
        let doc = self.list()?;
        let aggregator = ContentAggregator::new(self.content.as_ref(), self.settings.cascade_all);
        Ok(aggregator.compute_managed_file_contents(&doc.list))
    }

    /// Write every managed target.
    pub async fn sync(&self, opts: &WriteOptions) -> Result<SyncReport> {
        let files = self.managed_files()?;
        let file_sync = self.file_sync();
        Ok(SyncOrchestrator::new(&file_sync).sync_all(&files, opts).await)
    }

    /// Move an item to the trashcan, switching it off first.
    ///
    /// Returns `false` for an unknown id.
    pub fn move_to_trash(&self, id: &str) -> Result<bool> {
        let mut doc = self.list()?;
        let Some(item) = find(&doc.list, id) else {
            return Ok(false);
        };
        let list = if item.enabled && !item.is_default_item() {
            set_enabled(
                &doc.list,
                id,
                false,
                self.settings.choice_mode,
                self.settings.cascade_all,
            )
        } else {
            doc.list.clone()
        };

        let Some(list) = move_to_trashcan(&list, &mut doc.trashcan, id, now_ms())? else {
            return Ok(false);
        };
        doc.list = list;
        self.save(&mut doc)?;
        self.notifier.notify(Event::SelectionCleared);
        self.notifier.notify(Event::ListReloaded);
        Ok(true)
    }

    /// Restore a trashed item to its recorded place.
    pub fn restore(&self, id: &str) -> Result<bool> {
        let mut doc = self.list()?;
        let Some(list) = restore_from_trashcan(&doc.list, &mut doc.trashcan, id) else {
            return Ok(false);
        };
        doc.list = list;
        self.save(&mut doc)?;
        self.notifier.notify(Event::ListReloaded);
        Ok(true)
    }

    /// Permanently erase one trashed item, or all of them with `None`.
    ///
    /// Returns how many items were erased. Failures deleting their stored
    /// content are logged.
    pub fn purge(&self, id: Option<&str>) -> Result<usize> {
        let mut doc = self.list()?;
        let ids = match id {
            Some(id) => doc.trashcan.purge(id),
            None => doc.trashcan.purge_all(),
        };
        if ids.is_empty() {
            return Ok(0);
        }
        self.save(&mut doc)?;
        self.delete_content(&ids);
        self.notifier.notify(Event::ListReloaded);
        Ok(ids.len())
    }

    /// Hand a target back to its owner and forget it.
    ///
    /// The target gets its pre-management content back; if that write fails
    /// the removal still proceeds and the failure is reported as a warning.
    pub async fn remove_management(&self, id: &str) -> Result<RemovalReport> {
        let doc = self.list()?;
        let Some(node) = find(&doc.list, id).cloned() else {
            return Ok(RemovalReport {
                removed: false,
                restored: false,
                warning: None,
            });
        };
        let Some(file_path) = node.target_path().filter(|_| node.kind.is_container()) else {
            return Err(Error::NotAllowed {
                id: id.to_string(),
                reason: "not bound to a target file".to_string(),
            });
        };

        let default_content = match self.content.get(&default_item_id(id)) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(id, error = %e, "Cannot read default item content");
                None
            }
        };

        let (restored, warning) = match self
            .file_sync()
            .restore_original(file_path, default_content.as_deref())
            .await
        {
            Ok(_) => (true, None),
            Err(e) => {
                tracing::warn!(id, path = file_path, error = %e, "Failed to restore original content");
                (false, Some(e.to_string()))
            }
        };

        // Reload in case the tree changed while the write was in flight
        let mut doc = self.list()?;
        doc.list = tree::delete_by_id(&doc.list, id);
        self.save(&mut doc)?;
        self.delete_content(&collect_ids(&node));

        tracing::info!(id, path = file_path, restored, "Removed management");
        self.notifier.notify(Event::SelectionCleared);
        self.notifier.notify(Event::ListReloaded);
        Ok(RemovalReport {
            removed: true,
            restored,
            warning,
        })
    }

    /// Write history of a target, oldest first.
    pub fn history(&self, file_path: &str) -> Result<Vec<HistorySnapshot>> {
        let key = self.file_sync().resolve(file_path)?.display().to_string();
        self.history.list_for(&key)
    }

    /// Fetch a remote item's content and stamp its refresh time.
    ///
    /// Returns whether the content changed. Fetch failures are returned
    /// as-is and never retried here.
    pub async fn refresh_remote(&self, id: &str) -> Result<bool> {
        let doc = self.list()?;
        let item = find(&doc.list, id).ok_or_else(|| Error::InvalidId { id: id.to_string() })?;
        if item.kind != ItemKind::Remote {
            return Err(Error::NotRemote { id: id.to_string() });
        }
        let url = item
            .url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| Error::NoUrl { id: id.to_string() })?;

        let old_content = self.content.get_or_empty(id)?;
        tracing::debug!(id, url = %url, "Refreshing remote item");
        let new_content = self.fetcher.fetch(&url).await?;

        let stamp = ItemPatch {
            last_refresh: Some(Some(
                chrono::Local::now().format(LAST_REFRESH_FORMAT).to_string(),
            )),
            last_refresh_ms: Some(Some(now_ms())),
            ..ItemPatch::default()
        };
        let mut doc = self.list()?;
        doc.list = tree::update(&doc.list, id, &stamp);
        self.save(&mut doc)?;

        let changed = old_content != new_content;
        if changed {
            self.content.set(id, &new_content)?;
            self.notifier.notify(Event::ItemRefreshed { id: id.to_string() });
            self.notifier.notify(Event::ContentChanged { id: id.to_string() });
        }
        Ok(changed)
    }

    fn delete_content(&self, ids: &[String]) {
        if let Err(e) = self.content.delete_many(ids) {
            tracing::warn!(count = ids.len(), error = %e, "Failed to delete stored content");
        }
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
