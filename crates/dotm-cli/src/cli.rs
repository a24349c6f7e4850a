//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use dotm_core::{FolderMode, ItemKind, WriteMode};

/// Dotfile manager - compose dotfiles from switchable fragments
#[derive(Parser, Debug)]
#[command(name = "dotm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Data directory holding the tree, content and history
    #[arg(long, global = true, env = "DOTM_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show the configuration tree
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,

        /// Also show the trashcan
        #[arg(long)]
        trash: bool,
    },

    /// Print the content of an item
    ///
    /// Groups show their included items, folders their enabled children
    /// when cascading is on.
    Show {
        /// Item id
        id: String,
    },

    /// Add an item to the tree
    ///
    /// Examples:
    ///   dotm add Zsh --kind system-file --file-path ~/.zshrc
    ///   dotm add Aliases --parent <zsh-id> --content "alias ll='ls -la'" --on
    ///   dotm add Shared --parent <zsh-id> --kind remote --url https://example.com/a.sh
    Add {
        /// Item title
        title: String,

        /// Parent item id, top level when omitted
        #[arg(short, long)]
        parent: Option<String>,

        /// Item id, generated when omitted
        #[arg(long)]
        id: Option<String>,

        #[arg(short, long, value_enum, default_value_t = KindArg::Local)]
        kind: KindArg,

        /// Target file for folder and system-file items
        #[arg(short, long)]
        file_path: Option<String>,

        /// Source URL for remote items
        #[arg(short, long)]
        url: Option<String>,

        /// Seconds between scheduled refreshes of a remote item
        #[arg(long)]
        refresh_interval: Option<u64>,

        /// Item ids a group includes, in order
        #[arg(long, value_delimiter = ',')]
        include: Vec<String>,

        /// Choice mode of a container
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        #[command(flatten)]
        content: ContentArgs,

        /// Add the item switched on
        #[arg(long)]
        on: bool,
    },

    /// Change fields of an item
    Edit {
        /// Item id
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        file_path: Option<String>,

        #[arg(short, long)]
        url: Option<String>,

        #[arg(long)]
        refresh_interval: Option<u64>,

        #[arg(long, value_delimiter = ',')]
        include: Option<Vec<String>>,

        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        #[command(flatten)]
        content: ContentArgs,
    },

    /// Switch an item on, or off with --off
    Toggle {
        /// Item id
        id: String,

        /// Switch the item off
        #[arg(long)]
        off: bool,
    },

    /// Write every managed file
    Sync {
        /// Override the configured write mode
        #[arg(short, long, value_enum)]
        mode: Option<WriteModeArg>,

        /// Never prompt for a password
        #[arg(long)]
        no_prompt: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Move an item to the trashcan
    Trash {
        /// Item id
        id: String,
    },

    /// Restore an item from the trashcan
    Restore {
        /// Item id
        id: String,
    },

    /// Permanently erase trashed items
    Purge {
        /// Item id, every trashed item when omitted
        id: Option<String>,

        /// Skip the confirmation when purging everything
        #[arg(short, long)]
        yes: bool,
    },

    /// Stop managing a target and give back its original content
    RemoveManagement {
        /// Id of the folder or system-file item bound to the target
        id: String,

        /// Skip the confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the write history of a target file
    History {
        /// Target path as stored on its item
        path: String,

        /// Print the content of each snapshot
        #[arg(long)]
        content: bool,
    },

    /// Fetch remote items now
    Refresh {
        /// Remote item id, every due remote item when omitted
        id: Option<String>,
    },

    /// Keep refreshing remote items on their schedule
    Watch {
        /// Seconds between schedule checks, from settings when omitted
        #[arg(long)]
        interval: Option<u64>,
    },
}

/// New content for an item, inline or from a file.
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentArgs {
    /// Item content
    #[arg(long, conflicts_with = "content_file")]
    pub content: Option<String>,

    /// Read item content from a file
    #[arg(long)]
    pub content_file: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    Local,
    Remote,
    Group,
    Folder,
    SystemFile,
}

impl From<KindArg> for ItemKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Local => ItemKind::Local,
            KindArg::Remote => ItemKind::Remote,
            KindArg::Group => ItemKind::Group,
            KindArg::Folder => ItemKind::Folder,
            KindArg::SystemFile => ItemKind::SystemFile,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Follow the configured choice mode
    Default,
    /// At most one child on
    Single,
    /// Any number of children on
    Multi,
}

impl From<ModeArg> for FolderMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Default => FolderMode::Default,
            ModeArg::Single => FolderMode::Single,
            ModeArg::Multi => FolderMode::Multi,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteModeArg {
    /// Keep the file and own only the managed region
    Append,
    /// Replace the whole file
    Overwrite,
}

impl From<WriteModeArg> for WriteMode {
    fn from(mode: WriteModeArg) -> Self {
        match mode {
            WriteModeArg::Append => WriteMode::Append,
            WriteModeArg::Overwrite => WriteMode::Overwrite,
        }
    }
}
