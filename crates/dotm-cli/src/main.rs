//! Dotfile manager CLI
//!
//! Composes dotfiles from switchable fragments and writes them into place.

mod cli;
mod commands;
mod context;
mod error;
mod interactive;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::{AddArgs, EditArgs};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        println!("{} Dotfile manager CLI", "dotm".green().bold());
        println!();
        println!("Run {} for available commands.", "dotm --help".cyan());
        return Ok(());
    };

    let manager = context::open_manager(cli.data_dir.as_deref())?;
    execute_command(manager, command).await
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
    tracing::debug!("Verbose mode enabled");
}

async fn execute_command(manager: dotm_core::DotfileManager, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::List { json, trash } => commands::run_list(&manager, json, trash),
        Commands::Show { id } => commands::run_show(&manager, &id),
        Commands::Add {
            title,
            parent,
            id,
            kind,
            file_path,
            url,
            refresh_interval,
            include,
            mode,
            content,
            on,
        } => commands::run_add(
            &manager,
            AddArgs {
                title,
                parent,
                id,
                kind: kind.into(),
                file_path,
                url,
                refresh_interval,
                include,
                mode: mode.map(Into::into),
                content,
                on,
            },
        ),
        Commands::Edit {
            id,
            title,
            file_path,
            url,
            refresh_interval,
            include,
            mode,
            content,
        } => commands::run_edit(
            &manager,
            &id,
            EditArgs {
                title,
                file_path,
                url,
                refresh_interval,
                include,
                mode: mode.map(Into::into),
                content,
            },
        ),
        Commands::Toggle { id, off } => commands::run_toggle(&manager, &id, !off),
        Commands::Sync {
            mode,
            no_prompt,
            json,
        } => commands::run_sync(&manager, mode.map(Into::into), !no_prompt, json).await,
        Commands::Trash { id } => commands::run_trash(&manager, &id),
        Commands::Restore { id } => commands::run_restore(&manager, &id),
        Commands::Purge { id, yes } => commands::run_purge(&manager, id.as_deref(), yes),
        Commands::RemoveManagement { id, yes } => {
            commands::run_remove_management(&manager, &id, yes).await
        }
        Commands::History { path, content } => commands::run_history(&manager, &path, content),
        Commands::Refresh { id } => commands::run_refresh(&manager, id.as_deref()).await,
        Commands::Watch { interval } => commands::run_watch(manager, interval).await,
    }
}
