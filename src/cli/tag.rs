//! Tag commands.

use super::{CliContext, CommandResult, OutputFormat};
use crate::models::{NewTag, TagPatch};
use crate::Error;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TagRow {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    usage: usize,
}

/// Executes `tag add`.
///
/// # Errors
///
/// Returns an error if the name is empty or the store cannot be written.
pub fn cmd_tag_add(
    ctx: &CliContext,
    name: String,
    color: Option<String>,
    description: Option<String>,
) -> CommandResult {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput("tag name must not be empty".to_string()).into());
    }
    let mut fields = NewTag::new(name);
    if let Some(color) = color {
        fields = fields.with_color(color);
    }
    if let Some(description) = description.filter(|d| !d.is_empty()) {
        fields = fields.with_description(description);
    }
    let tag = ctx.store.create_tag(fields)?;
    println!("Created tag {} ({})", tag.id, tag.name);
    Ok(())
}

/// Executes `tag list`.
///
/// Lists catalog entries and any names prompts carry that are not in the
/// catalog, each with its usage count.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded.
pub fn cmd_tag_list(ctx: &CliContext, format: Option<String>) -> CommandResult {
    let usage: HashMap<String, usize> = ctx.store.tag_usage()?.into_iter().collect();
    let catalog = ctx.store.get_all_tags()?;

    let mut rows: Vec<TagRow> = catalog
        .iter()
        .map(|tag| TagRow {
            name: tag.name.clone(),
            id: Some(tag.id.clone()),
            color: tag.color.clone(),
            usage: usage.get(&tag.name).copied().unwrap_or(0),
        })
        .collect();
    for name in ctx.store.get_all_tag_names()? {
        if !catalog.iter().any(|t| t.name == name) {
            rows.push(TagRow {
                usage: usage.get(&name).copied().unwrap_or(0),
                name,
                id: None,
                color: None,
            });
        }
    }

    if OutputFormat::from_arg(format.as_deref()) == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("No tags found.");
        return Ok(());
    }

    println!("{:<24} {:<36} {:<10} USAGE", "NAME", "ID", "COLOR");
    println!("{}", "-".repeat(80));
    for row in &rows {
        println!(
            "{:<24} {:<36} {:<10} {}",
            row.name,
            row.id.as_deref().unwrap_or("-"),
            row.color.as_deref().unwrap_or(""),
            row.usage
        );
    }
    Ok(())
}

/// Executes `tag rename`. Prompts keep the names they already carry.
///
/// # Errors
///
/// Returns an error if the name is empty, the tag does not exist, or the
/// store cannot be written.
pub fn cmd_tag_rename(ctx: &CliContext, id: &str, name: String) -> CommandResult {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput("tag name must not be empty".to_string()).into());
    }
    let tag = ctx
        .store
        .update_tag(id, TagPatch::rename(name))?
        .ok_or_else(|| Error::NotFound(format!("tag {id}")))?;
    println!("Renamed tag {} to {}", tag.id, tag.name);
    Ok(())
}

/// Executes `tag delete`. The name is removed from every prompt carrying it.
///
/// # Errors
///
/// Returns an error if the tag does not exist or the store cannot be written.
pub fn cmd_tag_delete(ctx: &CliContext, id: &str) -> CommandResult {
    let tag = ctx.require_tag(id)?;
    if !ctx.store.delete_tag(id)? {
        return Err(Error::NotFound(format!("tag {id}")).into());
    }
    println!("Deleted tag {} ({})", tag.id, tag.name);
    Ok(())
}
