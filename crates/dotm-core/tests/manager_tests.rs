//! End-to-end tests for the manager facade over a sandboxed home

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dotm_core::{
    ChannelNotifier, ConfigItem, DotfileManager, Event, Fetcher, ItemKind, RefreshScheduler,
    Settings, WriteMode, WriteOptions,
};
use dotm_fs::DataLayout;
use dotm_test_utils::TestHome;
use dotm_test_utils::fixtures::{single_choice_folder, system_file, tree_document};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

/// Serves a fixed body and counts requests.
struct StaticFetcher {
    body: Mutex<String>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    fn new(body: &str) -> Arc<Self> {
        Arc::new(Self {
            body: Mutex::new(body.to_string()),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, _url: &str) -> dotm_core::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.body.lock().clone())
    }
}

fn manager_with(home: &TestHome, settings: Settings, list: Vec<serde_json::Value>) -> DotfileManager {
    home.write_data_file("tree.json", &tree_document(list));
    DotfileManager::new(DataLayout::new(home.data_dir()), settings).with_home_dir(home.home_dir())
}

fn zsh_manager(home: &TestHome) -> DotfileManager {
    home.write_file(".zshrc", "export EDITOR=vim\n");
    let manager = manager_with(home, Settings::default(), vec![system_file("zsh", &home.target(".zshrc"))]);
    manager.set_content("zsh-a", "alias a=1").unwrap();
    manager.set_content("zsh-b", "alias b=2").unwrap();
    manager
}

mod sync {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn writes_only_enabled_fragments() {
        let home = TestHome::new();
        let manager = zsh_manager(&home);

        let report = manager.sync(&WriteOptions::default()).await.unwrap();

        assert!(report.success);
        assert_eq!(report.changed, vec![home.target(".zshrc")]);
        let content = home.read_file(".zshrc");
        assert!(content.starts_with("export EDITOR=vim\n\n# --- DOTFILE_MANAGER_CONTENT_START ---"));
        assert!(content.contains("alias a=1"));
        assert!(!content.contains("alias b=2"));
    }

    #[tokio::test]
    async fn toggled_fragment_joins_with_blank_line() {
        let home = TestHome::new();
        let manager = zsh_manager(&home);

        assert!(manager.toggle("zsh-b", true).unwrap());
        manager.sync(&WriteOptions::default()).await.unwrap();

        home.assert_file_contains(".zshrc", "alias a=1\n\nalias b=2");
    }

    #[tokio::test]
    async fn disabling_every_fragment_clears_region() {
        let home = TestHome::new();
        let manager = zsh_manager(&home);
        manager.sync(&WriteOptions::default()).await.unwrap();

        manager.toggle("zsh-a", false).unwrap();
        manager.sync(&WriteOptions::default()).await.unwrap();

        assert_eq!(home.read_file(".zshrc"), "export EDITOR=vim");
    }

    #[tokio::test]
    async fn json_targets_are_deep_merged() {
        let home = TestHome::new();
        let settings = Settings {
            write_mode: WriteMode::Overwrite,
            ..Settings::default()
        };
        let manager = manager_with(
            &home,
            settings,
            vec![system_file("code", &home.target("settings.json"))],
        );
        manager.set_content("code-a", r#"{"a":1}"#).unwrap();
        manager.set_content("code-b", r#"{"a":2,"b":3}"#).unwrap();
        manager.toggle("code-b", true).unwrap();

        manager.sync(&WriteOptions::default()).await.unwrap();

        assert_eq!(home.read_file("settings.json"), "{\n  \"a\": 2,\n  \"b\": 3\n}");
    }

    #[tokio::test]
    async fn history_is_listed_by_target_path() {
        let home = TestHome::new();
        let manager = zsh_manager(&home);

        manager.sync(&WriteOptions::default()).await.unwrap();

        let history = manager.history(&home.target(".zshrc")).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "export EDITOR=vim\n");
        assert!(history[1].content.contains("alias a=1"));
    }
}

mod tree_edits {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn toggle_enforces_single_choice() {
        let home = TestHome::new();
        let manager = manager_with(&home, Settings::default(), vec![single_choice_folder("p")]);

        manager.toggle("p-2", true).unwrap();

        let folder = manager.find_item("p").unwrap().unwrap();
        let enabled: Vec<&str> = folder
            .children
            .iter()
            .filter(|c| c.enabled)
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(enabled, vec!["p-2"]);
    }

    #[test]
    fn toggle_unknown_id_reports_false() {
        let home = TestHome::new();
        let manager = manager_with(&home, Settings::default(), vec![]);
        assert!(!manager.toggle("missing", true).unwrap());
    }

    #[test]
    fn add_item_assigns_id_and_stores_content() {
        let home = TestHome::new();
        let manager = manager_with(&home, Settings::default(), vec![]);

        let id = manager
            .add_item(None, ConfigItem::local("", "Aliases"), Some("alias g=git"))
            .unwrap();

        assert!(!id.is_empty());
        assert_eq!(manager.item_content(&id).unwrap().as_deref(), Some("alias g=git"));
        assert_eq!(manager.list().unwrap().list.len(), 1);
    }

    #[test]
    fn add_item_rejects_duplicates_and_unsafe_ids() {
        let home = TestHome::new();
        let manager = manager_with(&home, Settings::default(), vec![single_choice_folder("p")]);

        let err = manager
            .add_item(Some("p"), ConfigItem::local("p-1", "Again"), None)
            .unwrap_err();
        assert!(matches!(err, dotm_core::Error::DuplicateId { .. }));

        assert!(
            manager
                .add_item(None, ConfigItem::local("../escape", "Bad"), None)
                .is_err()
        );
    }

    #[test]
    fn add_item_refuses_content_for_containers() {
        let home = TestHome::new();
        let manager = manager_with(&home, Settings::default(), vec![]);

        let err = manager
            .add_item(None, ConfigItem::folder("f", "F"), Some("x"))
            .unwrap_err();

        assert!(matches!(err, dotm_core::Error::NotAllowed { .. }));
        assert!(manager.find_item("f").unwrap().is_none());
        assert_eq!(manager.content_store().get("f").unwrap(), None);
    }

    #[test]
    fn saving_adds_default_item_to_new_targets() {
        let home = TestHome::new();
        let manager = manager_with(&home, Settings::default(), vec![]);

        let id = manager
            .add_item(
                None,
                ConfigItem::system_file("git", "Git", home.target(".gitconfig")),
                None,
            )
            .unwrap();

        let item = manager.find_item(&id).unwrap().unwrap();
        assert_eq!(item.children[0].id, format!("{id}-default"));
        assert!(item.folder_open);
    }

    #[test]
    fn group_content_lists_included_items() {
        let home = TestHome::new();
        let manager = zsh_manager(&home);
        let group = ConfigItem::new("g", "Bundle", ItemKind::Group).with_include(["zsh-a", "zsh-b"]);
        manager.add_item(Some("zsh"), group, None).unwrap();

        let content = manager.item_content("g").unwrap().unwrap();
        assert_eq!(
            content,
            "# file: Fragment A\nalias a=1\n\n# file: Fragment B\nalias b=2"
        );
    }

    #[test]
    fn toggle_emits_list_reloaded() {
        let home = TestHome::new();
        let notifier = Arc::new(ChannelNotifier::default());
        let mut events = notifier.subscribe();
        let manager = manager_with(&home, Settings::default(), vec![single_choice_folder("p")])
            .with_notifier(notifier);

        manager.toggle("p-3", true).unwrap();

        assert_eq!(events.try_recv().unwrap(), Event::ListReloaded);
    }
}

mod trashcan {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn trash_and_restore_round_trip() {
        let home = TestHome::new();
        let manager = manager_with(&home, Settings::default(), vec![single_choice_folder("p")]);

        assert!(manager.move_to_trash("p-1").unwrap());
        let doc = manager.list().unwrap();
        assert!(manager.find_item("p-1").unwrap().is_none());
        assert_eq!(doc.trashcan.len(), 1);

        assert!(manager.restore("p-1").unwrap());
        let folder = manager.find_item("p").unwrap().unwrap();
        assert_eq!(folder.children[0].id, "p-1");
        assert!(!folder.children[0].enabled);
        assert!(manager.list().unwrap().trashcan.is_empty());
    }

    #[test]
    fn purge_deletes_stored_content() {
        let home = TestHome::new();
        let manager = manager_with(&home, Settings::default(), vec![single_choice_folder("p")]);
        manager.set_content("p-2", "profile two").unwrap();

        manager.move_to_trash("p-2").unwrap();
        assert_eq!(manager.purge(Some("p-2")).unwrap(), 1);

        assert!(manager.list().unwrap().trashcan.is_empty());
        assert_eq!(manager.content_store().get("p-2").unwrap(), None);
        assert!(!manager.restore("p-2").unwrap());
    }

    #[test]
    fn system_files_cannot_be_trashed() {
        let home = TestHome::new();
        let manager = zsh_manager(&home);

        let err = manager.move_to_trash("zsh").unwrap_err();
        assert!(matches!(err, dotm_core::Error::NotAllowed { .. }));
    }
}

mod remove_management {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn restores_target_and_forgets_item() {
        let home = TestHome::new();
        let manager = zsh_manager(&home);
        manager.sync(&WriteOptions::default()).await.unwrap();

        let report = manager.remove_management("zsh").await.unwrap();

        assert!(report.removed);
        assert!(report.restored);
        assert_eq!(report.warning, None);
        assert_eq!(home.read_file(".zshrc"), "export EDITOR=vim");
        assert!(manager.find_item("zsh").unwrap().is_none());
        assert_eq!(manager.content_store().get("zsh-a").unwrap(), None);
    }

    #[tokio::test]
    async fn failed_restore_is_a_warning_and_removal_proceeds() {
        let home = TestHome::new();
        // A regular file where the target's directory should be
        home.write_file("blocker", "");
        let manager = manager_with(
            &home,
            Settings::default(),
            vec![system_file("zsh", &home.target("blocker/.zshrc"))],
        );
        manager.set_content("zsh-a", "alias a=1").unwrap();

        let report = manager.remove_management("zsh").await.unwrap();

        assert!(report.removed);
        assert!(!report.restored);
        assert!(report.warning.is_some());
        assert!(manager.find_item("zsh").unwrap().is_none());
        assert_eq!(manager.content_store().get("zsh-a").unwrap(), None);
    }

    #[tokio::test]
    async fn unknown_id_removes_nothing() {
        let home = TestHome::new();
        let manager = zsh_manager(&home);

        let report = manager.remove_management("missing").await.unwrap();
        assert!(!report.removed);
    }

    #[tokio::test]
    async fn local_items_are_not_targets() {
        let home = TestHome::new();
        let manager = zsh_manager(&home);

        assert!(manager.remove_management("zsh-a").await.is_err());
    }
}

mod remote {
    use super::*;
    use pretty_assertions::assert_eq;

    fn with_remote(home: &TestHome, fetcher: Arc<StaticFetcher>) -> (DotfileManager, String) {
        let manager = zsh_manager(home).with_fetcher(fetcher);
        let remote = ConfigItem::new("", "Shared aliases", ItemKind::Remote)
            .with_url("https://example.com/aliases.sh")
            .with_refresh_interval(60)
            .with_enabled(true);
        let id = manager.add_item(Some("zsh"), remote, None).unwrap();
        (manager, id)
    }

    #[tokio::test]
    async fn refresh_stores_content_and_stamps_time() {
        let home = TestHome::new();
        let fetcher = StaticFetcher::new("alias r=remote");
        let (manager, id) = with_remote(&home, fetcher.clone());

        assert!(manager.refresh_remote(&id).await.unwrap());
        assert!(!manager.refresh_remote(&id).await.unwrap());

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
        assert_eq!(manager.item_content(&id).unwrap().as_deref(), Some("alias r=remote"));
        let item = manager.find_item(&id).unwrap().unwrap();
        assert!(item.last_refresh.is_some());
        assert!(item.last_refresh_ms.is_some_and(|ms| ms > 0));
    }

    #[tokio::test]
    async fn refreshed_content_stays_out_of_target() {
        let home = TestHome::new();
        let (manager, id) = with_remote(&home, StaticFetcher::new("alias r=remote"));

        manager.refresh_remote(&id).await.unwrap();
        manager.sync(&WriteOptions::default()).await.unwrap();

        home.assert_file_contains(".zshrc", "alias a=1");
        assert!(!home.read_file(".zshrc").contains("alias r=remote"));
    }

    #[tokio::test]
    async fn refresh_rejects_unsuitable_items() {
        let home = TestHome::new();
        let (manager, _) = with_remote(&home, StaticFetcher::new(""));
        let bare = ConfigItem::new("bare", "No url", ItemKind::Remote);
        manager.add_item(Some("zsh"), bare, None).unwrap();

        let code = |r: dotm_core::Result<bool>| r.unwrap_err().code();
        assert_eq!(code(manager.refresh_remote("missing").await), "invalid_id");
        assert_eq!(code(manager.refresh_remote("zsh-a").await), "not_remote");
        assert_eq!(code(manager.refresh_remote("bare").await), "no_url");
    }

    #[tokio::test]
    async fn scheduled_tick_refreshes_due_items_once() {
        let home = TestHome::new();
        let fetcher = StaticFetcher::new("alias r=remote");
        let (manager, _) = with_remote(&home, fetcher.clone());

        assert_eq!(RefreshScheduler::tick(&manager).await, 1);
        // Just refreshed, so not due again yet
        assert_eq!(RefreshScheduler::tick(&manager).await, 0);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }
}
