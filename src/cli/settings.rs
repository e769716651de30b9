//! Settings commands.

use super::{CliContext, CommandResult};

/// Executes `settings show`.
///
/// # Errors
///
/// Returns an error if the settings file cannot be read.
pub fn cmd_settings_show(ctx: &CliContext) -> CommandResult {
    let settings = ctx.settings.get()?;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    println!();
    println!("Data directory: {}", ctx.config.data_dir.display());
    Ok(())
}

/// Executes `settings shortcut`.
///
/// # Errors
///
/// Returns an error if the shortcut does not parse or settings cannot be written.
pub fn cmd_settings_shortcut(ctx: &CliContext, value: &str, disable: bool) -> CommandResult {
    let settings = ctx.settings.set_quick_picker_shortcut(value, !disable)?;
    let shortcut = &settings.global_shortcut;
    println!(
        "Quick picker shortcut: {} ({})",
        shortcut.quick_picker,
        if shortcut.enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}
