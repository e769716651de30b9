//! Import, export, and backup commands.

use super::{CliContext, CommandResult};
use crate::io::{
    Format, ImportService, ImportStrategy, default_export_file_name, export_to_file,
};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Executes `import`.
///
/// With `preview` the document is validated and summarized without storing.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the store cannot be written.
pub fn cmd_import(ctx: &CliContext, file: &Path, replace: bool, preview: bool) -> CommandResult {
    let service = ImportService::new(Arc::clone(&ctx.store));

    if preview {
        let json = std::fs::read_to_string(file)?;
        let report = service.preview(&json)?;
        println!(
            "{} valid prompt(s), {} error(s), {} duplicate(s)",
            report.prompts.len(),
            report.errors.len(),
            report.duplicates.len()
        );
        for prompt in &report.prompts {
            println!("  {}  {}", prompt.id, prompt.title);
        }
        for title in &report.duplicates {
            println!("  duplicate: {title}");
        }
        for error in &report.errors {
            println!("  error: {error}");
        }
        return Ok(());
    }

    let strategy = if replace {
        ImportStrategy::Replace
    } else {
        ImportStrategy::Merge
    };
    let result = service.import_file(file, strategy)?;

    for error in &result.errors {
        eprintln!("  {error}");
    }
    if !result.success {
        return Err(format!("Import failed: {} error(s)", result.errors.len()).into());
    }
    println!(
        "Imported {} prompt(s) ({} duplicate(s), {} skipped)",
        result.imported_count,
        result.duplicates,
        result.errors.len()
    );
    Ok(())
}

/// Executes `export`.
///
/// Without a file the default `prompts-export-<date>` name is used in the
/// current directory. Without `--format` it is detected from the extension,
/// falling back to JSON for the default name.
///
/// # Errors
///
/// Returns an error if the format is unknown or the file cannot be written.
pub fn cmd_export(ctx: &CliContext, file: Option<PathBuf>, format: Option<String>) -> CommandResult {
    let format = format.as_deref().map(Format::from_str).transpose()?;
    let path = file.unwrap_or_else(|| {
        PathBuf::from(default_export_file_name(
            format.unwrap_or(Format::Json),
            chrono::Local::now().date_naive(),
        ))
    });

    let prompts = ctx.store.get_all_prompts()?;
    let result = export_to_file(&path, format, &prompts)?;
    println!(
        "Exported {} prompt(s) as {} to {}",
        result.exported,
        result.format,
        result.path.display()
    );
    Ok(())
}

/// Executes `backup`.
///
/// # Errors
///
/// Returns an error if the backup cannot be written.
pub fn cmd_backup(ctx: &CliContext) -> CommandResult {
    let name = ctx.store.create_backup()?;
    println!("Backup written: {name}");
    Ok(())
}
