//! Prompt, search, and stats commands.

use super::{CliContext, CommandResult, OutputFormat, single_line, truncate};
use crate::models::{NewPrompt, Prompt, PromptPatch, extract_variables};
use crate::services::rank_prompts;
use crate::Error;
use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;

/// Arguments for `prompt add`.
#[derive(Debug, Clone, Default)]
pub struct AddPromptArgs {
    /// Title.
    pub title: String,
    /// Inline content.
    pub content: Option<String>,
    /// Read content from this file.
    pub from_file: Option<PathBuf>,
    /// Optional description.
    pub description: Option<String>,
    /// Tag names.
    pub tags: Vec<String>,
    /// Folder id.
    pub folder: Option<String>,
}

/// Arguments for `prompt edit`.
#[derive(Debug, Clone, Default)]
pub struct EditPromptArgs {
    /// Prompt id.
    pub id: String,
    /// New title.
    pub title: Option<String>,
    /// New content.
    pub content: Option<String>,
    /// New description; an empty string clears it.
    pub description: Option<String>,
    /// Replacement tag list.
    pub tags: Vec<String>,
    /// Remove all tags.
    pub clear_tags: bool,
    /// Move into this folder.
    pub folder: Option<String>,
    /// Remove from its folder.
    pub no_folder: bool,
}

/// Parses `KEY=VALUE` pairs.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for a pair without `=` or with an empty key.
pub fn parse_variables(pairs: &[String]) -> crate::Result<HashMap<String, String>> {
    let mut values = HashMap::new();
    for pair in pairs {
        match pair.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                values.insert(key.trim().to_string(), value.to_string());
            },
            _ => {
                return Err(Error::InvalidInput(format!(
                    "Invalid variable '{pair}', expected KEY=VALUE"
                )));
            },
        }
    }
    Ok(values)
}

fn resolve_content(args: &AddPromptArgs) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(content) = &args.content {
        return Ok(content.clone());
    }
    if let Some(path) = &args.from_file {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut content = String::new();
    std::io::stdin().read_to_string(&mut content)?;
    Ok(content)
}

fn require_non_empty(field: &str, value: &str) -> crate::Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Executes `prompt add`.
///
/// Content comes from `--content`, `--from-file`, or stdin, in that order.
///
/// # Errors
///
/// Returns an error if the title or content is empty, the folder does not
/// exist, or the store cannot be written.
pub fn cmd_prompt_add(ctx: &CliContext, args: AddPromptArgs) -> CommandResult {
    let content = resolve_content(&args)?;
    require_non_empty("title", &args.title)?;
    require_non_empty("content", &content)?;
    if let Some(folder) = &args.folder {
        ctx.require_folder(folder)?;
    }

    let mut fields = NewPrompt::new(args.title, content).with_tags(args.tags);
    if let Some(description) = args.description.filter(|d| !d.is_empty()) {
        fields = fields.with_description(description);
    }
    if let Some(folder) = args.folder {
        fields = fields.in_folder(folder);
    }

    let prompt = ctx.store.create_prompt(fields)?;
    println!("Created prompt {} ({})", prompt.id, prompt.title);
    if !prompt.variables().is_empty() {
        println!("Variables: {}", prompt.variables().join(", "));
    }
    Ok(())
}

/// Executes `prompt list`.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded.
pub fn cmd_prompt_list(
    ctx: &CliContext,
    folder: Option<String>,
    uncategorized: bool,
    tags: Vec<String>,
    format: Option<String>,
) -> CommandResult {
    let mut prompts = if uncategorized {
        ctx.store.uncategorized_prompts()?
    } else if let Some(folder) = folder.as_deref() {
        ctx.store.prompts_in_folder(Some(folder))?
    } else {
        ctx.store.get_all_prompts()?
    };
    if !tags.is_empty() {
        prompts.retain(|p| tags.iter().any(|t| p.has_tag(t)));
    }

    print_prompts(&prompts, OutputFormat::from_arg(format.as_deref()))
}

fn print_prompts(prompts: &[Prompt], format: OutputFormat) -> CommandResult {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(prompts)?);
        return Ok(());
    }

    if prompts.is_empty() {
        println!("No prompts found.");
        return Ok(());
    }

    println!("{:<36} {:<30} {:<6} TAGS", "ID", "TITLE", "USAGE");
    println!("{}", "-".repeat(90));
    for prompt in prompts {
        println!(
            "{:<36} {:<30} {:<6} {}",
            prompt.id,
            truncate(&prompt.title, 30),
            prompt.usage_count,
            prompt.tags.join(", ")
        );
    }
    println!();
    println!("Total: {} prompts", prompts.len());
    Ok(())
}

/// Executes `prompt show`.
///
/// # Errors
///
/// Returns an error if the prompt does not exist.
pub fn cmd_prompt_show(ctx: &CliContext, id: &str, format: Option<String>) -> CommandResult {
    let prompt = ctx.require_prompt(id)?;

    if OutputFormat::from_arg(format.as_deref()) == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&prompt)?);
        return Ok(());
    }

    println!("{}", prompt.title);
    println!("  ID:        {}", prompt.id);
    if let Some(description) = &prompt.description {
        println!("  Description: {description}");
    }
    if !prompt.tags.is_empty() {
        println!("  Tags:      {}", prompt.tags.join(", "));
    }
    if let Some(folder) = &prompt.folder_id {
        println!("  Folder:    {folder}");
    }
    if !prompt.variables().is_empty() {
        println!("  Variables: {}", prompt.variables().join(", "));
    }
    println!("  Usage:     {}", prompt.usage_count);
    println!("  Created:   {}", prompt.created_at.to_rfc3339());
    println!("  Updated:   {}", prompt.updated_at.to_rfc3339());
    println!();
    println!("{}", prompt.content());
    Ok(())
}

/// Executes `prompt edit`.
///
/// # Errors
///
/// Returns an error if nothing would change, the prompt or folder does not
/// exist, or the store cannot be written.
pub fn cmd_prompt_edit(ctx: &CliContext, args: EditPromptArgs) -> CommandResult {
    let mut patch = PromptPatch::new();
    if let Some(title) = args.title {
        require_non_empty("title", &title)?;
        patch = patch.title(title);
    }
    if let Some(content) = args.content {
        require_non_empty("content", &content)?;
        patch = patch.content(content);
    }
    if let Some(description) = args.description {
        patch = patch.description(Some(description).filter(|d| !d.is_empty()));
    }
    if args.clear_tags {
        patch = patch.tags(Vec::<String>::new());
    } else if !args.tags.is_empty() {
        patch = patch.tags(args.tags);
    }
    if args.no_folder {
        patch = patch.folder(None);
    } else if let Some(folder) = args.folder {
        ctx.require_folder(&folder)?;
        patch = patch.folder(Some(folder));
    }

    if patch.is_empty() {
        return Err(Error::InvalidInput("nothing to update".to_string()).into());
    }

    let prompt = ctx
        .store
        .update_prompt(&args.id, patch)?
        .ok_or_else(|| Error::NotFound(format!("prompt {}", args.id)))?;
    println!("Updated prompt {} ({})", prompt.id, prompt.title);
    Ok(())
}

/// Executes `prompt delete`.
///
/// # Errors
///
/// Returns an error if none of the ids exist or the store cannot be written.
pub fn cmd_prompt_delete(ctx: &CliContext, ids: &[String]) -> CommandResult {
    let removed = ctx.store.delete_prompts(ids)?;
    if removed == 0 {
        return Err(Error::NotFound(format!("prompt {}", ids.join(", "))).into());
    }
    println!("Deleted {removed} prompt(s)");
    Ok(())
}

/// Executes `prompt copy`: prints the rendered content and records the use.
///
/// Placeholders without a value are left as written and listed on stderr.
///
/// # Errors
///
/// Returns an error if a variable pair is malformed, the prompt does not
/// exist, or the store cannot be written.
pub fn cmd_prompt_copy(ctx: &CliContext, id: &str, vars: &[String]) -> CommandResult {
    let values = parse_variables(vars)?;
    let text = ctx
        .store
        .copy_prompt_content(id, Some(&values))?
        .ok_or_else(|| Error::NotFound(format!("prompt {id}")))?;

    let unfilled = extract_variables(&text)
        .into_iter()
        .filter(|name| !values.contains_key(name))
        .collect::<Vec<_>>();
    if !unfilled.is_empty() {
        eprintln!("Unfilled variables: {}", unfilled.join(", "));
    }

    println!("{text}");
    Ok(())
}

/// Executes `search`.
///
/// Without `--ranked` this is the listing filter (substring match on title,
/// content, or description plus optional tags). With `--ranked` results are
/// scored and ordered the way the quick picker orders them.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded.
pub fn cmd_search(
    ctx: &CliContext,
    query: &str,
    tags: Vec<String>,
    ranked: bool,
    format: Option<String>,
) -> CommandResult {
    let format = OutputFormat::from_arg(format.as_deref());

    if !ranked {
        let prompts = ctx.store.search_prompts(query, &tags)?;
        return print_prompts(&prompts, format);
    }

    let mut all = ctx.store.get_all_prompts()?;
    if !tags.is_empty() {
        all.retain(|p| tags.iter().any(|t| p.has_tag(t)));
    }
    let results = rank_prompts(&all, query);

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }
    if results.is_empty() {
        println!("No prompts found.");
        return Ok(());
    }

    println!("{:<6} {:<36} {:<30} PREVIEW", "SCORE", "ID", "TITLE");
    println!("{}", "-".repeat(100));
    for result in &results {
        println!(
            "{:<6} {:<36} {:<30} {}",
            result.score,
            result.prompt.id,
            truncate(&result.prompt.title, 30),
            truncate(&single_line(result.prompt.content()), 40)
        );
    }
    Ok(())
}

/// Executes `stats`.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded.
pub fn cmd_stats(ctx: &CliContext, format: Option<String>) -> CommandResult {
    let stats = ctx.store.get_statistics()?;

    if OutputFormat::from_arg(format.as_deref()) == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Prompts:          {}", stats.total_prompts);
    println!("Folders:          {}", stats.total_folders);
    println!("Tags:             {}", stats.total_tags);
    println!("Total copies:     {}", stats.total_usage);
    println!("Created (7 days): {}", stats.recently_created);
    println!("Updated (7 days): {}", stats.recently_updated);
    Ok(())
}
