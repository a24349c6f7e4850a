//! Synchronizing every managed target in one pass.

use std::collections::BTreeMap;

use futures::future::join_all;
use serde::{Deserialize, Serialize};

use super::file_sync::{FileSync, WriteOptions, WriteOutcome};
use crate::aggregate::ManagedFile;

/// Why one target failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncFailure {
    /// Machine-readable code, `no_access` when a credential is needed
    pub code: String,
    pub message: String,
}

/// Report from a synchronization pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Whether every target succeeded
    pub success: bool,
    /// Per target path: whether it succeeded
    pub results: BTreeMap<String, bool>,
    /// Per target path: the failure, for failed targets only
    pub errors: BTreeMap<String, SyncFailure>,
    /// Target paths whose content actually changed
    pub changed: Vec<String>,
}

impl SyncReport {
    /// Whether any failure asks for an elevated credential.
    pub fn needs_credential(&self) -> bool {
        self.errors.values().any(|e| e.code == "no_access")
    }

    pub fn failed_paths(&self) -> Vec<&str> {
        self.errors.keys().map(String::as_str).collect()
    }
}

/// Runs [`FileSync`] over a set of aggregated targets.
pub struct SyncOrchestrator<'a> {
    file_sync: &'a FileSync,
}

impl<'a> SyncOrchestrator<'a> {
    pub fn new(file_sync: &'a FileSync) -> Self {
        Self { file_sync }
    }

    /// Write every target concurrently and wait for all of them.
    ///
    /// One failing target never stops the others. The report succeeds only
    /// when every target did.
    pub async fn sync_all(&self, files: &[ManagedFile], opts: &WriteOptions) -> SyncReport {
        let writes = files.iter().map(|file| async move {
            let result = self
                .file_sync
                .write_managed_file(&file.file_path, &file.content, opts)
                .await;
            (file.file_path.clone(), result)
        });

        let mut report = SyncReport {
            success: true,
            ..SyncReport::default()
        };
        for (path, result) in join_all(writes).await {
            match result {
                Ok(outcome) => {
                    if let WriteOutcome::Written { .. } = outcome {
                        report.changed.push(path.clone());
                    }
                    report.results.insert(path, true);
                }
                Err(e) => {
                    tracing::warn!(path = %path, code = e.code(), error = %e, "Failed to sync target");
                    report.success = false;
                    report.results.insert(path.clone(), false);
                    report.errors.insert(
                        path,
                        SyncFailure {
                            code: e.code().to_string(),
                            message: e.to_string(),
                        },
                    );
                }
            }
        }

        tracing::info!(
            targets = report.results.len(),
            changed = report.changed.len(),
            failed = report.errors.len(),
            "Synchronization pass finished"
        );
        report
    }
}
