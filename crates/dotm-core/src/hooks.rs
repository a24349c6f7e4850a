//! Post-write command hook
//!
//! Configured in settings as a `[post_write_hook]` table and run as a
//! detached subprocess after every successful target write.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::process::Command;

/// Variable holding the absolute path of the file just written.
pub const FILE_PATH_VAR: &str = "FILE_PATH";

/// Configuration for the post-write hook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostWriteHook {
    /// The command to execute
    #[serde(default)]
    pub command: String,
    /// Arguments, with `${FILE_PATH}` substituted
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

impl PostWriteHook {
    /// Variables available to the hook for `file_path`.
    pub fn vars_for(file_path: &Path) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert(FILE_PATH_VAR.to_string(), file_path.display().to_string());
        vars
    }

    /// Arguments after variable substitution.
    pub fn resolved_args(&self, vars: &HashMap<String, String>) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| substitute_vars(arg, vars))
            .collect()
    }

    /// Run the hook for `file_path` without waiting for it.
    ///
    /// Failures are logged and never reach the caller. Must be called from
    /// within a tokio runtime.
    pub fn spawn(&self, file_path: &Path) {
        if self.command.trim().is_empty() {
            return;
        }
        let hook = self.clone();
        let file_path = file_path.to_path_buf();
        tokio::spawn(async move {
            hook.run(&file_path).await;
        });
    }

    /// Run the hook to completion, logging the outcome.
    pub async fn run(&self, file_path: &Path) -> bool {
        let vars = Self::vars_for(file_path);
        let mut cmd = Command::new(&self.command);
        cmd.args(self.resolved_args(&vars)).envs(&vars);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        match cmd.output().await {
            Ok(output) if output.status.success() => {
                tracing::debug!(command = %self.command, ?file_path, "Post-write hook finished");
                true
            }
            Ok(output) => {
                tracing::warn!(
                    command = %self.command,
                    exit_code = ?output.status.code(),
                    stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                    "Post-write hook exited with non-zero status"
                );
                false
            }
            Err(e) => {
                tracing::warn!(command = %self.command, error = %e, "Post-write hook failed to start");
                false
            }
        }
    }
}

/// Substitute `${VAR_NAME}` patterns with context variables
fn substitute_vars(input: &str, vars: &HashMap<String, String>) -> String {
    let mut result = input.to_string();
    for (key, value) in vars {
        let pattern = format!("${{{}}}", key);
        result = result.replace(&pattern, value);
    }
    result
}
