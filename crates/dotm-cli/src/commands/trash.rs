//! Trashcan commands

use colored::Colorize;
use dotm_core::DotfileManager;

use crate::error::{CliError, Result};
use crate::interactive;

/// Run the trash command
pub fn run_trash(manager: &DotfileManager, id: &str) -> Result<()> {
    if !manager.move_to_trash(id)? {
        return Err(CliError::unknown_item(id));
    }
    println!("{} Moved {} to the trashcan", "OK".green().bold(), id.cyan());
    Ok(())
}

/// Run the restore command
pub fn run_restore(manager: &DotfileManager, id: &str) -> Result<()> {
    if !manager.restore(id)? {
        return Err(CliError::user(format!(
            "Cannot restore '{id}': not in the trashcan or its parent is gone"
        )));
    }
    println!("{} Restored {}", "OK".green().bold(), id.cyan());
    Ok(())
}

/// Run the purge command
pub fn run_purge(manager: &DotfileManager, id: Option<&str>, yes: bool) -> Result<()> {
    if id.is_none() && !yes {
        if !interactive::can_prompt() {
            return Err(CliError::user("Refusing to empty the trashcan without --yes"));
        }
        if !interactive::confirm("Permanently erase everything in the trashcan?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let erased = manager.purge(id)?;
    if erased == 0 {
        println!("Nothing to purge.");
    } else {
        println!("{} Erased {} item(s)", "OK".green().bold(), erased);
    }
    Ok(())
}
