//! Writing managed files, their history, and giving them back

use chrono::{Local, TimeZone};
use colored::Colorize;
use dotm_core::{DotfileManager, SyncReport, WriteMode, WriteOptions};

use crate::error::{CliError, Result};
use crate::interactive;

/// Run the sync command
///
/// When a target needs elevated permissions and prompting is allowed, asks
/// for a password once and retries.
pub async fn run_sync(
    manager: &DotfileManager,
    mode: Option<WriteMode>,
    prompt: bool,
    json: bool,
) -> Result<()> {
    let opts = WriteOptions {
        write_mode: mode,
        ..WriteOptions::default()
    };

    let mut report = manager.sync(&opts).await?;
    if report.needs_credential() && prompt && interactive::can_prompt() {
        let credential = interactive::prompt_credential(&report.failed_paths())?;
        report = manager.sync(&opts.with_credential(credential)).await?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.success {
        Ok(())
    } else {
        Err(CliError::user(format!(
            "{} of {} files failed to sync",
            report.errors.len(),
            report.results.len()
        )))
    }
}

fn print_report(report: &SyncReport) {
    if report.results.is_empty() {
        println!("No managed files.");
        return;
    }
    for (path, ok) in &report.results {
        if !ok {
            continue;
        }
        let status = if report.changed.contains(path) {
            "WROTE".green().bold()
        } else {
            "OK".dimmed()
        };
        println!("{status} {}", path.cyan());
    }
    for (path, failure) in &report.errors {
        println!(
            "{} {} ({}): {}",
            "FAILED".red().bold(),
            path.cyan(),
            failure.code.dimmed(),
            failure.message
        );
    }
    if report.needs_credential() {
        println!();
        println!(
            "Some files need elevated permissions. Run {} in a terminal to enter a password.",
            "dotm sync".cyan()
        );
    }
}

/// Run the history command
pub fn run_history(manager: &DotfileManager, path: &str, show_content: bool) -> Result<()> {
    let snapshots = manager.history(path)?;
    if snapshots.is_empty() {
        println!("No history for {}", path.cyan());
        return Ok(());
    }

    for snapshot in snapshots {
        let when = Local
            .timestamp_millis_opt(snapshot.add_time_ms)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| snapshot.add_time_ms.to_string());
        println!(
            "{} {} {}",
            when,
            snapshot.id.dimmed(),
            format!("({} bytes)", snapshot.content.len()).dimmed()
        );
        if show_content {
            println!("{}", snapshot.content);
            println!();
        }
    }
    Ok(())
}

/// Run the remove-management command
pub async fn run_remove_management(manager: &DotfileManager, id: &str, yes: bool) -> Result<()> {
    let item = manager
        .find_item(id)?
        .ok_or_else(|| CliError::unknown_item(id))?;
    let target = item.target_path().unwrap_or_default().to_string();

    if !yes {
        if !interactive::can_prompt() {
            return Err(CliError::user("Refusing to remove management without --yes"));
        }
        let prompt = format!("Stop managing {target} and delete '{}'?", item.title);
        if !interactive::confirm(&prompt)? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let report = manager.remove_management(id).await?;
    if let Some(warning) = &report.warning {
        eprintln!(
            "{} could not restore {}: {}",
            "warning:".yellow().bold(),
            target.cyan(),
            warning
        );
    }
    println!(
        "{} {} is no longer managed",
        "OK".green().bold(),
        target.cyan()
    );
    Ok(())
}
