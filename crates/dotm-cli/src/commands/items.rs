//! Commands that read and edit the configuration tree

use colored::Colorize;
use dotm_core::{ConfigItem, DotfileManager, FolderMode, ItemKind, ItemPatch, TreeDocument};

use crate::cli::ContentArgs;
use crate::error::{CliError, Result};

/// Fields of a new item.
#[derive(Debug, Clone, Default)]
pub struct AddArgs {
    pub title: String,
    pub parent: Option<String>,
    pub id: Option<String>,
    pub kind: ItemKind,
    pub file_path: Option<String>,
    pub url: Option<String>,
    pub refresh_interval: Option<u64>,
    pub include: Vec<String>,
    pub mode: Option<FolderMode>,
    pub content: ContentArgs,
    pub on: bool,
}

/// Fields to change on an existing item.
#[derive(Debug, Clone, Default)]
pub struct EditArgs {
    pub title: Option<String>,
    pub file_path: Option<String>,
    pub url: Option<String>,
    pub refresh_interval: Option<u64>,
    pub include: Option<Vec<String>>,
    pub mode: Option<FolderMode>,
    pub content: ContentArgs,
}

/// Run the list command
pub fn run_list(manager: &DotfileManager, json: bool, show_trash: bool) -> Result<()> {
    let doc = manager.list()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    if doc.list.is_empty() {
        println!("No items yet. Use {} to add one.", "dotm add <title>".cyan());
    } else {
        print_items(&doc.list, 0);
    }

    if show_trash {
        print_trash(&doc);
    }
    Ok(())
}

fn print_items(items: &[ConfigItem], depth: usize) {
    for item in items {
        let state = if item.enabled {
            "[x]".green().bold()
        } else {
            "[ ]".dimmed()
        };
        let mut line = format!(
            "{}{} {} {} {}",
            "  ".repeat(depth),
            state,
            item.title,
            item.id.dimmed(),
            format!("({})", item.kind).dimmed()
        );
        if let Some(path) = item.target_path() {
            line.push_str(&format!(" -> {}", path.cyan()));
        }
        if item.folder_mode == FolderMode::Single {
            line.push_str(&format!(" {}", "single".yellow()));
        }
        println!("{line}");
        print_items(&item.children, depth + 1);
    }
}

fn print_trash(doc: &TreeDocument) {
    println!();
    println!("{}", "Trashcan".bold());
    if doc.trashcan.is_empty() {
        println!("  {}", "empty".dimmed());
        return;
    }
    for entry in doc.trashcan.entries() {
        let from = entry.parent_id.as_deref().unwrap_or("top level");
        println!(
            "  {} {} {}",
            entry.data.title,
            entry.data.id.dimmed(),
            format!("(from {from})").dimmed()
        );
    }
}

/// Run the show command
pub fn run_show(manager: &DotfileManager, id: &str) -> Result<()> {
    let content = manager
        .item_content(id)?
        .ok_or_else(|| CliError::unknown_item(id))?;
    println!("{content}");
    Ok(())
}

/// Run the add command, printing the new item's id
pub fn run_add(manager: &DotfileManager, args: AddArgs) -> Result<()> {
    let content = read_content(&args.content)?;
    if content.is_some() && !matches!(args.kind, ItemKind::Local | ItemKind::Remote) {
        return Err(CliError::user(format!(
            "A {} item has no content of its own",
            args.kind
        )));
    }

    let mut item = ConfigItem::new(args.id.unwrap_or_default(), args.title, args.kind)
        .with_enabled(args.on)
        .with_include(args.include);
    item.file_path = args.file_path;
    item.url = args.url;
    item.refresh_interval = args.refresh_interval;
    if let Some(mode) = args.mode {
        item.folder_mode = mode;
    }

    let id = manager.add_item(args.parent.as_deref(), item, content.as_deref())?;
    if args.on {
        manager.toggle(&id, true)?;
    }
    println!("{id}");
    Ok(())
}

/// Run the edit command
pub fn run_edit(manager: &DotfileManager, id: &str, args: EditArgs) -> Result<()> {
    let patch = ItemPatch {
        title: args.title,
        file_path: args.file_path.map(|p| Some(p).filter(|p| !p.is_empty())),
        url: args.url.map(|u| Some(u).filter(|u| !u.is_empty())),
        refresh_interval: args.refresh_interval.map(Some),
        include: args.include,
        folder_mode: args.mode,
        ..ItemPatch::default()
    };

    let content = read_content(&args.content)?;
    if patch == ItemPatch::default() && content.is_none() {
        return Err(CliError::user("Nothing to change"));
    }

    if patch != ItemPatch::default() && !manager.update_item(id, &patch)? {
        return Err(CliError::unknown_item(id));
    }
    if let Some(content) = content
        && !manager.set_content(id, &content)?
    {
        return Err(CliError::unknown_item(id));
    }

    println!("{} Updated {}", "OK".green().bold(), id.cyan());
    Ok(())
}

/// Run the toggle command
pub fn run_toggle(manager: &DotfileManager, id: &str, enabled: bool) -> Result<()> {
    if !manager.toggle(id, enabled)? {
        return Err(CliError::unknown_item(id));
    }
    let state = if enabled { "on".green() } else { "off".yellow() };
    println!("{} {} is {}", "OK".green().bold(), id.cyan(), state);
    Ok(())
}

fn read_content(args: &ContentArgs) -> Result<Option<String>> {
    match (&args.content, &args.content_file) {
        (Some(content), _) => Ok(Some(content.clone())),
        (None, Some(path)) => Ok(Some(std::fs::read_to_string(path)?)),
        (None, None) => Ok(None),
    }
}
