//! Refreshing remote items

use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use dotm_core::{DotfileManager, RefreshScheduler};

use crate::error::{CliError, Result};

/// Run the refresh command
///
/// Without an id, refreshes every remote item whose interval has elapsed.
pub async fn run_refresh(manager: &DotfileManager, id: Option<&str>) -> Result<()> {
    match id {
        Some(id) => {
            let changed = manager.refresh_remote(id).await?;
            let state = if changed { "updated" } else { "unchanged" };
            println!("{} {} {}", "OK".green().bold(), id.cyan(), state);
        }
        None => {
            let refreshed = RefreshScheduler::tick(manager).await;
            println!("{} Refreshed {} remote item(s)", "OK".green().bold(), refreshed);
        }
    }
    Ok(())
}

/// Run the watch command until the process is stopped
pub async fn run_watch(manager: DotfileManager, interval: Option<u64>) -> Result<()> {
    let secs = interval.unwrap_or(manager.settings().refresh_check_secs);
    if secs == 0 {
        return Err(CliError::user("The refresh interval must be positive"));
    }

    println!(
        "{} Checking remote items every {}s, press Ctrl-C to stop",
        "=>".blue().bold(),
        secs
    );
    let handle = RefreshScheduler::spawn(Arc::new(manager), Duration::from_secs(secs));
    handle
        .await
        .map_err(|e| CliError::user(format!("Refresh loop stopped: {e}")))
}
