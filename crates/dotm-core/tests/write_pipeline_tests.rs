//! Tests for the write pipeline and full synchronization passes

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use dotm_blocks::{CONTENT_END, CONTENT_START};
use dotm_core::{
    ChannelNotifier, Credential, ElevationSession, Event, FileSync, HistoryStore, InMemoryHistory,
    ManagedFile, PrivilegedWriter, Settings, SyncOrchestrator, WriteMode, WriteOptions,
    WriteOutcome,
};
use dotm_test_utils::TestHome;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

struct Harness {
    home: TestHome,
    history: Arc<InMemoryHistory>,
    notifier: Arc<ChannelNotifier>,
    sync: FileSync,
}

fn harness(settings: Settings) -> Harness {
    let home = TestHome::new();
    let history = Arc::new(InMemoryHistory::new());
    let notifier = Arc::new(ChannelNotifier::default());
    let sync = FileSync::new(settings, history.clone(), notifier.clone()).with_home_dir(home.home_dir());
    Harness {
        home,
        history,
        notifier,
        sync,
    }
}

fn key(home: &TestHome, rel: &str) -> String {
    home.home_dir().join(rel).display().to_string()
}

/// Make `rel` read-only. Returns `false` when the process can still write
/// it (running as root), in which case permission tests have nothing to
/// observe.
#[cfg(unix)]
fn make_read_only(home: &TestHome, rel: &str) -> bool {
    use std::os::unix::fs::PermissionsExt;

    let path = home.home_dir().join(rel);
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o444)).unwrap();
    std::fs::OpenOptions::new().write(true).open(&path).is_err()
}

/// Copies the temp file over the target, ignoring permissions, and records
/// every call.
#[derive(Default)]
struct RecordingWriter {
    fail: bool,
    calls: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl PrivilegedWriter for RecordingWriter {
    async fn write(&self, temp: &Path, target: &Path, credential: &Credential) -> dotm_core::Result<()> {
        self.calls
            .lock()
            .push((target.display().to_string(), credential.expose().to_string()));
        if self.fail {
            return Err(dotm_core::Error::ElevationFailed {
                path: target.to_path_buf(),
                message: "wrong password".to_string(),
            });
        }
        Ok(())
    }
}

mod append_mode {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn empty_file_gets_bare_managed_region() {
        let h = harness(Settings::default());
        h.home.write_file(".profile", "");

        let outcome = h
            .sync
            .write_managed_file(&h.home.target(".profile"), "PATH=/usr/bin", &WriteOptions::default())
            .await
            .unwrap();

        assert!(outcome.changed());
        assert_eq!(
            h.home.read_file(".profile"),
            format!("{CONTENT_START}\n\nPATH=/usr/bin\n\n{CONTENT_END}")
        );
    }

    #[tokio::test]
    async fn missing_file_and_parents_are_created() {
        let h = harness(Settings::default());

        h.sync
            .write_managed_file(&h.home.target(".config/app/rc"), "a=1", &WriteOptions::default())
            .await
            .unwrap();

        h.home.assert_file_contains(".config/app/rc", "a=1");
    }

    #[tokio::test]
    async fn external_content_is_kept_and_region_replaced() {
        let h = harness(Settings::default());
        h.home.write_file(".zshrc", "export EDITOR=vim\n");
        let target = h.home.target(".zshrc");

        h.sync
            .write_managed_file(&target, "alias ll='ls -la'", &WriteOptions::default())
            .await
            .unwrap();
        h.sync
            .write_managed_file(&target, "alias la='ls -A'", &WriteOptions::default())
            .await
            .unwrap();

        let content = h.home.read_file(".zshrc");
        assert!(content.starts_with("export EDITOR=vim\n\n"));
        assert!(content.contains("alias la='ls -A'"));
        assert!(!content.contains("alias ll"));
        assert_eq!(content.matches(CONTENT_START).count(), 1);
    }

    #[tokio::test]
    async fn blank_content_clears_previous_region() {
        let h = harness(Settings::default());
        h.home.write_file(".zshrc", "export EDITOR=vim\n");
        let target = h.home.target(".zshrc");

        h.sync
            .write_managed_file(&target, "alias ll='ls -la'", &WriteOptions::default())
            .await
            .unwrap();
        h.sync
            .write_managed_file(&target, "", &WriteOptions::default())
            .await
            .unwrap();

        assert_eq!(h.home.read_file(".zshrc"), "export EDITOR=vim");
    }
}

mod overwrite_mode {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn replaces_whole_file_without_markers() {
        let h = harness(Settings::default());
        h.home.write_file("settings.json", "{\"old\": true}");
        let opts = WriteOptions::default().with_mode(WriteMode::Overwrite);

        h.sync
            .write_managed_file(&h.home.target("settings.json"), "{\n  \"a\": 1\n}", &opts)
            .await
            .unwrap();

        assert_eq!(h.home.read_file("settings.json"), "{\n  \"a\": 1\n}");
    }

    #[tokio::test]
    async fn configured_mode_applies_without_override() {
        let settings = Settings {
            write_mode: WriteMode::Overwrite,
            ..Settings::default()
        };
        let h = harness(settings);
        h.home.write_file(".vimrc", "set nu");

        h.sync
            .write_managed_file(&h.home.target(".vimrc"), "set rnu", &WriteOptions::default())
            .await
            .unwrap();

        assert_eq!(h.home.read_file(".vimrc"), "set rnu");
    }
}

mod unchanged_content {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn identical_content_is_not_written_or_recorded() {
        let h = harness(Settings::default());
        let managed = format!("{CONTENT_START}\n\nPATH=/usr/bin\n\n{CONTENT_END}");
        h.home.write_file(".profile", &managed);
        let mut events = h.notifier.subscribe();

        let outcome = h
            .sync
            .write_managed_file(&h.home.target(".profile"), "PATH=/usr/bin", &WriteOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome, WriteOutcome::Unchanged);
        assert_eq!(h.home.read_file(".profile"), managed);
        assert!(h.history.list_for(&key(&h.home, ".profile")).unwrap().is_empty());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn blank_content_for_missing_file_creates_nothing() {
        let h = harness(Settings::default());

        let outcome = h
            .sync
            .write_managed_file(&h.home.target(".unused"), "", &WriteOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome, WriteOutcome::Unchanged);
        h.home.assert_file_not_exists(".unused");
    }
}

mod history_and_events {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn records_previous_then_current_content() {
        let h = harness(Settings::default());
        h.home.write_file(".bashrc", "original");
        let target = h.home.target(".bashrc");
        let opts = WriteOptions::default().with_mode(WriteMode::Overwrite);

        h.sync.write_managed_file(&target, "v1", &opts).await.unwrap();
        h.sync.write_managed_file(&target, "v2", &opts).await.unwrap();

        let contents: Vec<String> = h
            .history
            .list_for(&key(&h.home, ".bashrc"))
            .unwrap()
            .into_iter()
            .map(|s| s.content)
            .collect();
        assert_eq!(contents, vec!["original", "v1", "v2"]);
    }

    #[tokio::test]
    async fn history_is_pruned_to_limit() {
        let settings = Settings {
            history_limit: 2,
            ..Settings::default()
        };
        let h = harness(settings);
        let target = h.home.target(".bashrc");
        let opts = WriteOptions::default().with_mode(WriteMode::Overwrite);

        for version in ["v1", "v2", "v3", "v4"] {
            h.sync.write_managed_file(&target, version, &opts).await.unwrap();
        }

        let contents: Vec<String> = h
            .history
            .list_for(&key(&h.home, ".bashrc"))
            .unwrap()
            .into_iter()
            .map(|s| s.content)
            .collect();
        assert_eq!(contents, vec!["v3", "v4"]);
    }

    #[tokio::test]
    async fn emits_file_updated_unless_silent() {
        let h = harness(Settings::default());
        let mut events = h.notifier.subscribe();
        let target = h.home.target(".gitconfig");

        h.sync
            .write_managed_file(&target, "[user]", &WriteOptions::default())
            .await
            .unwrap();
        assert_eq!(
            events.try_recv().unwrap(),
            Event::FileUpdated {
                path: key(&h.home, ".gitconfig")
            }
        );

        h.sync
            .write_managed_file(&target, "[core]", &WriteOptions::default().silent())
            .await
            .unwrap();
        assert!(events.try_recv().is_err());
    }
}

mod restore {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn strips_managed_region() {
        let h = harness(Settings::default());
        h.home.write_file(
            ".zshrc",
            &format!("export A=1\n\n{CONTENT_START}\n\nalias x=y\n\n{CONTENT_END}\nexport B=2\n"),
        );

        h.sync
            .restore_original(&h.home.target(".zshrc"), Some("ignored"))
            .await
            .unwrap();

        assert_eq!(h.home.read_file(".zshrc"), "export A=1\n\n\nexport B=2");
    }

    #[tokio::test]
    async fn falls_back_to_default_content() {
        let h = harness(Settings::default());
        h.home.write_file("settings.json", "{\"managed\": true}");

        h.sync
            .restore_original(&h.home.target("settings.json"), Some("{\"user\": true}"))
            .await
            .unwrap();

        assert_eq!(h.home.read_file("settings.json"), "{\"user\": true}");
    }

    #[tokio::test]
    async fn blank_default_keeps_raw_file() {
        let h = harness(Settings::default());
        h.home.write_file(".vimrc", "set nu\n\n");

        h.sync
            .restore_original(&h.home.target(".vimrc"), Some("  \n"))
            .await
            .unwrap();

        assert_eq!(h.home.read_file(".vimrc"), "set nu");
    }
}

#[cfg(unix)]
mod permissions {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn unwritable_target_without_credential_reports_no_access() {
        let h = harness(Settings::default());
        h.home.write_file("hosts", "127.0.0.1 localhost");
        if !make_read_only(&h.home, "hosts") {
            return;
        }

        let err = h
            .sync
            .write_managed_file(&h.home.target("hosts"), "10.0.0.1 dev", &WriteOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.code(), "no_access");
        assert_eq!(h.home.read_file("hosts"), "127.0.0.1 localhost");
        assert!(h.history.list_for(&key(&h.home, "hosts")).unwrap().is_empty());
    }

    #[tokio::test]
    async fn supplied_credential_goes_through_privileged_writer() {
        let h = harness(Settings::default());
        let writer = Arc::new(RecordingWriter::default());
        let session = Arc::new(ElevationSession::new());
        let sync = h
            .sync
            .clone()
            .with_privileged_writer(writer.clone())
            .with_session(session.clone());
        h.home.write_file("hosts", "127.0.0.1 localhost");
        if !make_read_only(&h.home, "hosts") {
            return;
        }

        let opts = WriteOptions::default().with_credential(Credential::new("hunter2"));
        sync.write_managed_file(&h.home.target("hosts"), "10.0.0.1 dev", &opts)
            .await
            .unwrap();

        assert_eq!(
            writer.calls.lock().clone(),
            vec![(key(&h.home, "hosts"), "hunter2".to_string())]
        );
        assert!(session.has_credential());
    }

    #[tokio::test]
    async fn failed_escalation_clears_cached_credential() {
        let h = harness(Settings::default());
        let writer = Arc::new(RecordingWriter {
            fail: true,
            ..RecordingWriter::default()
        });
        let session = Arc::new(ElevationSession::with_credential(Credential::new("stale")));
        let sync = h
            .sync
            .clone()
            .with_privileged_writer(writer)
            .with_session(session.clone());
        h.home.write_file("hosts", "127.0.0.1 localhost");
        if !make_read_only(&h.home, "hosts") {
            return;
        }

        let err = sync
            .write_managed_file(&h.home.target("hosts"), "10.0.0.1 dev", &WriteOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.code(), "no_access");
        assert!(!session.has_credential());
    }
}

mod orchestrator {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn one_failing_target_does_not_block_others() {
        let h = harness(Settings::default());
        // A regular file where a directory is expected
        h.home.write_file("blocker", "");
        let files = vec![
            ManagedFile {
                file_path: h.home.target(".zshrc"),
                content: "alias ll='ls -la'".to_string(),
            },
            ManagedFile {
                file_path: h.home.target("blocker/.rc"),
                content: "x=1".to_string(),
            },
        ];

        let report = SyncOrchestrator::new(&h.sync)
            .sync_all(&files, &WriteOptions::default())
            .await;

        assert!(!report.success);
        assert_eq!(report.results.get(&files[0].file_path), Some(&true));
        assert_eq!(report.results.get(&files[1].file_path), Some(&false));
        assert_eq!(report.failed_paths(), vec![files[1].file_path.as_str()]);
        assert_eq!(report.changed, vec![files[0].file_path.clone()]);
        assert!(!report.needs_credential());
        h.home.assert_file_contains(".zshrc", "alias ll='ls -la'");
    }

    #[tokio::test]
    async fn second_pass_changes_nothing() {
        let h = harness(Settings::default());
        let files = vec![ManagedFile {
            file_path: h.home.target(".zshrc"),
            content: "alias ll='ls -la'".to_string(),
        }];
        let orchestrator = SyncOrchestrator::new(&h.sync);

        let first = orchestrator.sync_all(&files, &WriteOptions::default()).await;
        let second = orchestrator.sync_all(&files, &WriteOptions::default()).await;

        assert!(first.success && second.success);
        assert_eq!(first.changed.len(), 1);
        assert!(second.changed.is_empty());
    }
}
