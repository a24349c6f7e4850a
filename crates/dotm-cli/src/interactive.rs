//! Interactive prompts for CLI commands

use std::io::IsTerminal;

use dialoguer::{Confirm, Password};
use dotm_core::Credential;

use crate::error::Result;

/// Whether prompts can be shown at all.
pub fn can_prompt() -> bool {
    std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
}

/// Ask for the password used to write protected files.
pub fn prompt_credential(paths: &[&str]) -> Result<Credential> {
    eprintln!("Writing these files needs elevated permissions:");
    for path in paths {
        eprintln!("  {path}");
    }
    let secret = Password::new()
        .with_prompt("Password")
        .allow_empty_password(false)
        .interact()?;
    Ok(Credential::new(secret))
}

/// Yes/no confirmation, defaulting to no.
pub fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}
