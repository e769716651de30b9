//! CLI command implementations.
//!
//! Each submodule implements one command group. The binary parses arguments
//! and dispatches here.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `prompt` | Add, list, show, edit, delete, and copy prompts |
//! | `search` | Filter or rank prompts by a query |
//! | `folder` | Manage folders |
//! | `tag` | Manage tags |
//! | `stats` | Collection statistics |
//! | `import` / `export` / `backup` | Bulk data transfer |
//! | `settings` | Show settings, change the quick picker shortcut |
//! | `pick` | Run one quick picker session |
//!
//! # Example Usage
//!
//! ```bash
//! promptdock prompt add --title "Email" --content "Write a {tone} email" --tag work
//! promptdock prompt copy <id> --var tone=formal
//! promptdock search email --ranked
//! promptdock export prompts.csv
//! ```

mod context;
mod folder;
mod io;
mod pick;
mod prompt;
mod settings;
mod tag;

pub use context::CliContext;
pub use folder::{cmd_folder_add, cmd_folder_delete, cmd_folder_list, cmd_folder_rename};
pub use io::{cmd_backup, cmd_export, cmd_import};
pub use pick::{HeadlessWindow, StdoutClipboard, cmd_pick};
pub use prompt::{
    AddPromptArgs, EditPromptArgs, cmd_prompt_add, cmd_prompt_copy, cmd_prompt_delete,
    cmd_prompt_edit, cmd_prompt_list, cmd_prompt_show, cmd_search, cmd_stats, parse_variables,
};
pub use settings::{cmd_settings_shortcut, cmd_settings_show};
pub use tag::{cmd_tag_add, cmd_tag_delete, cmd_tag_list, cmd_tag_rename};

/// Result type for command functions.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Parses output format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Table,
        }
    }

    /// Parses an optional format argument.
    #[must_use]
    pub fn from_arg(s: Option<&str>) -> Self {
        s.map_or(Self::Table, Self::parse)
    }
}

/// Shortens `text` to at most `max` characters, ending in `...` when cut.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Collapses newlines so multi-line text fits a table cell.
pub(crate) fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
