//! Elevated writes for targets the current user cannot write.
//!
//! The credential lives in an [`ElevationSession`] owned by the host and
//! threaded through write calls. A failed privileged write clears it so the
//! host asks again.

use std::fmt;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::{Error, Result};

/// A secret used to elevate. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Cached credential for the lifetime of a host session.
#[derive(Debug, Default)]
pub struct ElevationSession {
    credential: Mutex<Option<Credential>>,
}

impl ElevationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        let session = Self::new();
        session.set(credential);
        session
    }

    pub fn credential(&self) -> Option<Credential> {
        self.credential.lock().clone()
    }

    pub fn has_credential(&self) -> bool {
        self.credential.lock().is_some()
    }

    /// Cache `credential`. Empty credentials are ignored.
    pub fn set(&self, credential: Credential) {
        if credential.is_empty() {
            return;
        }
        *self.credential.lock() = Some(credential);
    }

    pub fn clear(&self) {
        if self.credential.lock().take().is_some() {
            tracing::debug!("Cleared cached credential");
        }
    }
}

/// Copies a prepared file over a target with elevated rights.
#[async_trait]
pub trait PrivilegedWriter: Send + Sync {
    /// Replace the content of `target` with that of `temp`, keeping the
    /// target's permission bits.
    async fn write(&self, temp: &Path, target: &Path, credential: &Credential) -> Result<()>;
}

/// [`PrivilegedWriter`] running `sudo -S` with the credential on stdin.
#[derive(Debug, Clone)]
pub struct SudoWriter {
    program: String,
}

impl Default for SudoWriter {
    fn default() -> Self {
        Self {
            program: "sudo".to_string(),
        }
    }
}

impl SudoWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use another sudo-compatible program.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl PrivilegedWriter for SudoWriter {
    async fn write(&self, temp: &Path, target: &Path, credential: &Credential) -> Result<()> {
        let mode = original_mode(target);
        // cp onto an existing file keeps its owner and inode
        let script = match mode {
            Some(_) => r#"cp "$1" "$2" && chmod "$3" "$2""#,
            None => r#"cp "$1" "$2""#,
        };

        let mut cmd = Command::new(&self.program);
        cmd.arg("-S")
            .arg("-p")
            .arg("")
            .arg("sh")
            .arg("-c")
            .arg(script)
            .arg("sh")
            .arg(temp)
            .arg(target);
        if let Some(mode) = mode {
            cmd.arg(format!("{mode:o}"));
        }

        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failed(target, e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            let line = format!("{}\n", credential.expose());
            stdin
                .write_all(line.as_bytes())
                .await
                .map_err(|e| failed(target, e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| failed(target, e.to_string()))?;

        if output.status.success() {
            tracing::info!(?target, "Wrote target with elevated rights");
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(failed(
                target,
                if stderr.is_empty() {
                    format!("exit code {:?}", output.status.code())
                } else {
                    stderr
                },
            ))
        }
    }
}

#[cfg(unix)]
fn original_mode(target: &Path) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(target)
        .ok()
        .map(|m| m.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn original_mode(_target: &Path) -> Option<u32> {
    None
}

fn failed(target: &Path, message: String) -> Error {
    Error::ElevationFailed {
        path: target.to_path_buf(),
        message,
    }
}
