//! Writing aggregated content into one target file.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dotm_blocks::{build_append, build_overwrite, extract_external_region, has_managed_region};
use dotm_fs::{checksum::same_content, resolve_path, resolve_path_with};

use crate::config::{Settings, WriteMode};
use crate::elevation::{Credential, ElevationSession, PrivilegedWriter, SudoWriter};
use crate::history::HistoryStore;
use crate::notify::{Event, Notifier};
use crate::{Error, Result};

/// Per-call options for [`FileSync::write_managed_file`].
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Overrides the configured write mode
    pub write_mode: Option<WriteMode>,
    /// Credential to cache in the session before writing
    pub credential: Option<Credential>,
    /// Suppress the file-updated notification
    pub silent: bool,
}

impl WriteOptions {
    pub fn with_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = Some(mode);
        self
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }
}

/// What a write did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file already had the desired content; nothing was touched
    Unchanged,
    Written { previous: String, current: String },
}

impl WriteOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, Self::Written { .. })
    }
}

/// The write pipeline for target files.
///
/// Resolves the path, places content according to the write mode, skips
/// writes that would not change the file, escalates on permission errors,
/// records history, notifies and runs the post-write hook.
#[derive(Clone)]
pub struct FileSync {
    settings: Settings,
    history: Arc<dyn HistoryStore>,
    notifier: Arc<dyn Notifier>,
    privileged: Arc<dyn PrivilegedWriter>,
    session: Arc<ElevationSession>,
    home_dir: Option<PathBuf>,
}

impl FileSync {
    pub fn new(
        settings: Settings,
        history: Arc<dyn HistoryStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            settings,
            history,
            notifier,
            privileged: Arc::new(SudoWriter::new()),
            session: Arc::new(ElevationSession::new()),
            home_dir: None,
        }
    }

    pub fn with_privileged_writer(mut self, writer: Arc<dyn PrivilegedWriter>) -> Self {
        self.privileged = writer;
        self
    }

    pub fn with_session(mut self, session: Arc<ElevationSession>) -> Self {
        self.session = session;
        self
    }

    /// Resolve `~` against `home` instead of the real home directory.
    pub fn with_home_dir(mut self, home: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(home.into());
        self
    }

    pub fn session(&self) -> &ElevationSession {
        &self.session
    }

    /// Absolute path of a stored target path.
    pub fn resolve(&self, file_path: &str) -> Result<PathBuf> {
        match &self.home_dir {
            Some(home) => {
                let cwd = std::env::current_dir()?;
                Ok(resolve_path_with(file_path, Some(home), Some(&cwd))?)
            }
            None => Ok(resolve_path(file_path)?),
        }
    }

    /// Write `desired` into the target at `file_path`.
    ///
    /// A missing file reads as empty. In append mode `desired` becomes the
    /// managed region of the existing content. When the result hashes the
    /// same as what is on disk nothing is written and no history is kept.
    ///
    /// # Errors
    ///
    /// [`Error::NoAccess`] when the target is not writable and no credential
    /// is cached or supplied; the target is left untouched. A failing
    /// privileged write clears the cached credential.
    pub async fn write_managed_file(
        &self,
        file_path: &str,
        desired: &str,
        opts: &WriteOptions,
    ) -> Result<WriteOutcome> {
        let abs_path = self.resolve(file_path)?;

        if let Some(parent) = abs_path.parent()
            && let Err(e) = tokio::fs::create_dir_all(parent).await
        {
            tracing::warn!(?parent, error = %e, "Failed to create parent directory");
        }

        let existing = read_existing(&abs_path).await?;
        let mode = opts.write_mode.unwrap_or(self.settings.write_mode);
        let content = match mode {
            WriteMode::Append => build_append(&existing, desired),
            WriteMode::Overwrite => build_overwrite(desired),
        };

        if same_content(&content, &existing) {
            tracing::debug!(path = ?abs_path, %mode, "Target already up to date");
            return Ok(WriteOutcome::Unchanged);
        }

        match tokio::fs::write(&abs_path, content.as_bytes()).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                self.write_elevated(&abs_path, &content, opts).await?;
            }
            Err(e) => return Err(dotm_fs::Error::io(&abs_path, e).into()),
        }
        tracing::info!(path = ?abs_path, %mode, "Wrote target");

        let key = abs_path.display().to_string();
        if let Err(e) = self.record_history(&key, &existing, &content) {
            tracing::warn!(path = %key, error = %e, "Failed to record history");
        }

        if !opts.silent {
            self.notifier.notify(Event::FileUpdated { path: key });
        }

        if let Some(hook) = &self.settings.post_write_hook {
            hook.spawn(&abs_path);
        }

        Ok(WriteOutcome::Written {
            previous: existing,
            current: content,
        })
    }

    /// Put back the content the target had before it was managed.
    ///
    /// Prefers stripping the managed region, then `default_content` when it
    /// is not blank, then the raw file. The write is silent and always uses
    /// overwrite mode.
    pub async fn restore_original(
        &self,
        file_path: &str,
        default_content: Option<&str>,
    ) -> Result<WriteOutcome> {
        let abs_path = self.resolve(file_path)?;
        let default_content = default_content.filter(|c| !c.trim().is_empty());

        let original = match read_existing(&abs_path).await {
            Ok(raw) if has_managed_region(&raw) => extract_external_region(&raw),
            Ok(raw) => match default_content {
                Some(default) => default.to_string(),
                None => raw.trim_end().to_string(),
            },
            Err(e) => {
                tracing::warn!(path = ?abs_path, error = %e, "Cannot read target, using stored default");
                default_content.unwrap_or_default().to_string()
            }
        };

        let opts = WriteOptions::default()
            .with_mode(WriteMode::Overwrite)
            .silent();
        self.write_managed_file(file_path, &original, &opts).await
    }

    async fn write_elevated(&self, abs_path: &Path, content: &str, opts: &WriteOptions) -> Result<()> {
        if let Some(credential) = &opts.credential {
            self.session.set(credential.clone());
        }
        let Some(credential) = self.session.credential() else {
            tracing::info!(path = ?abs_path, "Target not writable, credential required");
            return Err(Error::NoAccess {
                path: abs_path.to_path_buf(),
            });
        };

        let mut temp = tempfile::NamedTempFile::new()?;
        temp.write_all(content.as_bytes())?;
        temp.flush()?;

        if let Err(e) = self
            .privileged
            .write(temp.path(), abs_path, &credential)
            .await
        {
            self.session.clear();
            tracing::warn!(path = ?abs_path, error = %e, "Privileged write failed");
            return Err(e);
        }
        Ok(())
    }

    fn record_history(&self, key: &str, previous: &str, current: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        let latest = self.history.latest_for(key)?;
        if latest.is_none_or(|s| s.content != previous) {
            self.history.append(key, previous, now)?;
        }
        self.history.append(key, current, now)?;

        if self.settings.history_limit > 0 {
            self.history.prune(key, self.settings.history_limit)?;
        }
        Ok(())
    }
}

async fn read_existing(path: &Path) -> Result<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(dotm_fs::Error::io(path, e).into()),
    }
}
