//! Folder commands.

use super::{CliContext, CommandResult, OutputFormat, truncate};
use crate::models::{FolderPatch, NewFolder};
use crate::Error;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FolderRow {
    #[serde(flatten)]
    folder: crate::models::Folder,
    prompt_count: usize,
}

/// Executes `folder add`.
///
/// # Errors
///
/// Returns an error if the name is empty or the store cannot be written.
pub fn cmd_folder_add(ctx: &CliContext, name: String, description: Option<String>) -> CommandResult {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput("folder name must not be empty".to_string()).into());
    }
    let mut fields = NewFolder::new(name);
    if let Some(description) = description.filter(|d| !d.is_empty()) {
        fields = fields.with_description(description);
    }
    let folder = ctx.store.create_folder(fields)?;
    println!("Created folder {} ({})", folder.id, folder.name);
    Ok(())
}

/// Executes `folder list`, with the number of prompts in each folder.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded.
pub fn cmd_folder_list(ctx: &CliContext, format: Option<String>) -> CommandResult {
    let prompts = ctx.store.get_all_prompts()?;
    let rows: Vec<FolderRow> = ctx
        .store
        .get_all_folders()?
        .into_iter()
        .map(|folder| {
            let prompt_count = prompts
                .iter()
                .filter(|p| p.folder_id.as_deref() == Some(folder.id.as_str()))
                .count();
            FolderRow {
                folder,
                prompt_count,
            }
        })
        .collect();

    if OutputFormat::from_arg(format.as_deref()) == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("No folders found.");
        return Ok(());
    }

    println!("{:<36} {:<30} PROMPTS", "ID", "NAME");
    println!("{}", "-".repeat(76));
    for row in &rows {
        println!(
            "{:<36} {:<30} {}",
            row.folder.id,
            truncate(&row.folder.name, 30),
            row.prompt_count
        );
    }
    Ok(())
}

/// Executes `folder rename`.
///
/// # Errors
///
/// Returns an error if the name is empty, the folder does not exist, or the
/// store cannot be written.
pub fn cmd_folder_rename(ctx: &CliContext, id: &str, name: String) -> CommandResult {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput("folder name must not be empty".to_string()).into());
    }
    let folder = ctx
        .store
        .update_folder(id, FolderPatch::rename(name))?
        .ok_or_else(|| Error::NotFound(format!("folder {id}")))?;
    println!("Renamed folder {} to {}", folder.id, folder.name);
    Ok(())
}

/// Executes `folder delete`. Prompts in the folder are kept and detached.
///
/// # Errors
///
/// Returns an error if the folder does not exist or the store cannot be written.
pub fn cmd_folder_delete(ctx: &CliContext, id: &str) -> CommandResult {
    if !ctx.store.delete_folder(id)? {
        return Err(Error::NotFound(format!("folder {id}")).into());
    }
    println!("Deleted folder {id}");
    Ok(())
}
