//! Binary entry point for promptdock.
//!
//! This binary provides the CLI interface for the promptdock snippet manager.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use promptdock::cli::{
    AddPromptArgs, CliContext, CommandResult, EditPromptArgs, cmd_backup, cmd_export,
    cmd_folder_add, cmd_folder_delete, cmd_folder_list, cmd_folder_rename, cmd_import, cmd_pick,
    cmd_prompt_add, cmd_prompt_copy, cmd_prompt_delete, cmd_prompt_edit, cmd_prompt_list,
    cmd_prompt_show, cmd_search, cmd_settings_shortcut, cmd_settings_show, cmd_stats,
    cmd_tag_add, cmd_tag_delete, cmd_tag_list, cmd_tag_rename,
};
use promptdock::config::{CONFIG_PATH_ENV, PromptdockConfig};
use promptdock::observability;
use std::path::PathBuf;
use std::process::ExitCode;

/// Promptdock - A snippet manager for reusable text prompts.
#[derive(Parser)]
#[command(name = "promptdock")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Manage prompts.
    Prompt {
        /// Prompt subcommand.
        #[command(subcommand)]
        action: PromptAction,
    },

    /// Search prompts.
    Search {
        /// The search query.
        query: String,

        /// Only prompts carrying one of these tags.
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Score and order results like the quick picker.
        #[arg(long)]
        ranked: bool,

        /// Output format: table or json.
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Manage folders.
    Folder {
        /// Folder subcommand.
        #[command(subcommand)]
        action: FolderAction,
    },

    /// Manage tags.
    Tag {
        /// Tag subcommand.
        #[command(subcommand)]
        action: TagAction,
    },

    /// Show collection statistics.
    Stats {
        /// Output format: table or json.
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Import prompts from a JSON file.
    Import {
        /// File to import.
        file: PathBuf,

        /// Replace the whole collection instead of merging.
        #[arg(long)]
        replace: bool,

        /// Validate and summarize without importing.
        #[arg(long)]
        preview: bool,
    },

    /// Export all prompts.
    Export {
        /// Output file (default: prompts-export-<date>.<ext>).
        file: Option<PathBuf>,

        /// Export format: json, csv, or markdown.
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Write a timestamped backup of all collections.
    Backup,

    /// Show or change settings.
    Settings {
        /// Settings subcommand.
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Run one quick picker session and print the copied text.
    Pick {
        /// The query to type.
        query: String,

        /// Result row to copy (0 = best match).
        #[arg(short, long, default_value = "0")]
        index: usize,
    },
}

/// Prompt subcommands.
#[derive(Subcommand)]
enum PromptAction {
    /// Add a prompt.
    Add {
        /// Title.
        #[arg(short, long)]
        title: String,

        /// Content with {variable} placeholders (default: read stdin).
        #[arg(short, long)]
        content: Option<String>,

        /// Read content from a file.
        #[arg(long, conflicts_with = "content")]
        from_file: Option<PathBuf>,

        /// Description.
        #[arg(short, long)]
        description: Option<String>,

        /// Tag name (repeatable).
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Folder id.
        #[arg(long)]
        folder: Option<String>,
    },

    /// List prompts.
    List {
        /// Only prompts in this folder.
        #[arg(long, conflicts_with = "uncategorized")]
        folder: Option<String>,

        /// Only prompts without tags.
        #[arg(long)]
        uncategorized: bool,

        /// Only prompts carrying one of these tags.
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Output format: table or json.
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Show one prompt.
    Show {
        /// Prompt id.
        id: String,

        /// Output format: table or json.
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Edit a prompt.
    Edit {
        /// Prompt id.
        id: String,

        /// New title.
        #[arg(short, long)]
        title: Option<String>,

        /// New content.
        #[arg(short, long)]
        content: Option<String>,

        /// New description (empty to clear).
        #[arg(short, long)]
        description: Option<String>,

        /// Replacement tag list (repeatable).
        #[arg(long = "tag", conflicts_with = "clear_tags")]
        tags: Vec<String>,

        /// Remove all tags.
        #[arg(long)]
        clear_tags: bool,

        /// Move into a folder.
        #[arg(long, conflicts_with = "no_folder")]
        folder: Option<String>,

        /// Remove from its folder.
        #[arg(long)]
        no_folder: bool,
    },

    /// Delete prompts.
    Delete {
        /// Prompt ids.
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Render a prompt, print it, and count the use.
    Copy {
        /// Prompt id.
        id: String,

        /// Variable values as KEY=VALUE (repeatable).
        #[arg(long = "var")]
        vars: Vec<String>,
    },
}

/// Folder subcommands.
#[derive(Subcommand)]
enum FolderAction {
    /// Add a folder.
    Add {
        /// Folder name.
        name: String,

        /// Description.
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List folders.
    List {
        /// Output format: table or json.
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Rename a folder.
    Rename {
        /// Folder id.
        id: String,
        /// New name.
        name: String,
    },

    /// Delete a folder; its prompts are kept.
    Delete {
        /// Folder id.
        id: String,
    },
}

/// Tag subcommands.
#[derive(Subcommand)]
enum TagAction {
    /// Add a tag.
    Add {
        /// Tag name.
        name: String,

        /// Display color.
        #[arg(long)]
        color: Option<String>,

        /// Description.
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List tags with usage counts.
    List {
        /// Output format: table or json.
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Rename a tag.
    Rename {
        /// Tag id.
        id: String,
        /// New name.
        name: String,
    },

    /// Delete a tag and remove it from every prompt.
    Delete {
        /// Tag id.
        id: String,
    },
}

/// Settings subcommands.
#[derive(Subcommand)]
enum SettingsAction {
    /// Show current settings.
    Show,

    /// Set the quick picker shortcut, e.g. `CommandOrControl+Shift+P`.
    Shortcut {
        /// Shortcut string.
        value: String,

        /// Store the shortcut but disable it.
        #[arg(long)]
        disable: bool,
    },
}

/// Main entry point.
#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init_from_settings(&config.logging, cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
async fn run_command(command: Commands, config: PromptdockConfig) -> CommandResult {
    let ctx = CliContext::open(config)?;

    match command {
        Commands::Prompt { action } => run_prompt(&ctx, action),

        Commands::Search {
            query,
            tags,
            ranked,
            format,
        } => cmd_search(&ctx, &query, tags, ranked, format),

        Commands::Folder { action } => match action {
            FolderAction::Add { name, description } => cmd_folder_add(&ctx, name, description),
            FolderAction::List { format } => cmd_folder_list(&ctx, format),
            FolderAction::Rename { id, name } => cmd_folder_rename(&ctx, &id, name),
            FolderAction::Delete { id } => cmd_folder_delete(&ctx, &id),
        },

        Commands::Tag { action } => match action {
            TagAction::Add {
                name,
                color,
                description,
            } => cmd_tag_add(&ctx, name, color, description),
            TagAction::List { format } => cmd_tag_list(&ctx, format),
            TagAction::Rename { id, name } => cmd_tag_rename(&ctx, &id, name),
            TagAction::Delete { id } => cmd_tag_delete(&ctx, &id),
        },

        Commands::Stats { format } => cmd_stats(&ctx, format),

        Commands::Import {
            file,
            replace,
            preview,
        } => cmd_import(&ctx, &file, replace, preview),

        Commands::Export { file, format } => cmd_export(&ctx, file, format),

        Commands::Backup => cmd_backup(&ctx),

        Commands::Settings { action } => match action {
            SettingsAction::Show => cmd_settings_show(&ctx),
            SettingsAction::Shortcut { value, disable } => {
                cmd_settings_shortcut(&ctx, &value, disable)
            },
        },

        Commands::Pick { query, index } => cmd_pick(&ctx, query, index).await,
    }
}

/// Dispatches `prompt` subcommands.
fn run_prompt(ctx: &CliContext, action: PromptAction) -> CommandResult {
    match action {
        PromptAction::Add {
            title,
            content,
            from_file,
            description,
            tags,
            folder,
        } => cmd_prompt_add(
            ctx,
            AddPromptArgs {
                title,
                content,
                from_file,
                description,
                tags,
                folder,
            },
        ),

        PromptAction::List {
            folder,
            uncategorized,
            tags,
            format,
        } => cmd_prompt_list(ctx, folder, uncategorized, tags, format),

        PromptAction::Show { id, format } => cmd_prompt_show(ctx, &id, format),

        PromptAction::Edit {
            id,
            title,
            content,
            description,
            tags,
            clear_tags,
            folder,
            no_folder,
        } => cmd_prompt_edit(
            ctx,
            EditPromptArgs {
                id,
                title,
                content,
                description,
                tags,
                clear_tags,
                folder,
                no_folder,
            },
        ),

        PromptAction::Delete { ids } => cmd_prompt_delete(ctx, &ids),

        PromptAction::Copy { id, vars } => cmd_prompt_copy(ctx, &id, &vars),
    }
}

/// Loads configuration from an explicit path or the default location, then
/// applies environment overrides.
fn load_config(path: Option<&std::path::Path>) -> promptdock::Result<PromptdockConfig> {
    let config = match path {
        Some(path) => PromptdockConfig::load_from_file(path)?,
        None => PromptdockConfig::load_default(),
    };
    Ok(config.with_env_overrides())
}
