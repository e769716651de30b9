//! One-shot quick picker session.

use super::{CliContext, CommandResult};
use crate::models::WindowPosition;
use crate::services::{Clipboard, CopyOutcome, Key, KeyOutcome, PickerWindow, QuickPicker};
use crate::{Error, Result};
use std::sync::Arc;

/// Clipboard that prints copied text to stdout.
#[derive(Debug, Default)]
pub struct StdoutClipboard;

impl Clipboard for StdoutClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        println!("{text}");
        Ok(())
    }
}

/// Window with nothing to hide and no position.
#[derive(Debug, Default)]
pub struct HeadlessWindow;

impl PickerWindow for HeadlessWindow {
    fn hide(&self) -> Result<()> {
        Ok(())
    }

    fn outer_position(&self) -> Option<WindowPosition> {
        None
    }
}

/// Executes `pick`: types `query`, moves down `index` rows, and presses Enter.
///
/// # Errors
///
/// Returns an error if nothing matches, `index` is out of range, or the copy
/// fails.
pub async fn cmd_pick(ctx: &CliContext, query: String, index: usize) -> CommandResult {
    let mut picker = QuickPicker::new(
        Arc::clone(&ctx.store),
        Arc::new(StdoutClipboard),
        Arc::new(HeadlessWindow),
        ctx.config.quick_picker.clone(),
    )
    .with_settings(Arc::clone(&ctx.settings));

    picker.activate()?;
    picker.set_query(query.clone());
    picker.settle().await;

    let count = picker.results().len();
    if count == 0 {
        picker.close();
        return Err(Error::NotFound(format!("no prompt matches '{query}'")).into());
    }
    if index >= count {
        picker.close();
        return Err(Error::InvalidInput(format!(
            "index {index} out of range, {count} result(s)"
        ))
        .into());
    }

    for _ in 0..index {
        picker.handle_key(Key::Down);
    }

    match picker.handle_key(Key::Enter) {
        KeyOutcome::Activated(CopyOutcome::Copied { .. }) => {
            picker.wait_closed().await;
            Ok(())
        },
        KeyOutcome::Activated(CopyOutcome::Fallback { prompt_id, .. }) => {
            eprintln!("Copied raw content of {prompt_id}; usage was not recorded");
            picker.close();
            Ok(())
        },
        _ => {
            picker.close();
            Err(Error::Clipboard("copy failed".to_string()).into())
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PromptdockConfig;
    use crate::models::NewPrompt;
    use crate::storage::MemoryGateway;

    fn context() -> CliContext {
        let ctx = CliContext::with_gateway(PromptdockConfig::default(), Arc::new(MemoryGateway::new()));
        ctx.store.create_prompt(NewPrompt::new("Alpha", "first")).unwrap();
        ctx.store.create_prompt(NewPrompt::new("Alphabet", "second")).unwrap();
        ctx
    }

    #[tokio::test(start_paused = true)]
    async fn test_pick_copies_selected_row() {
        let ctx = context();

        cmd_pick(&ctx, "alpha".to_string(), 1).await.unwrap();

        let used: Vec<_> = ctx
            .store
            .get_all_prompts()
            .unwrap()
            .into_iter()
            .filter(|p| p.usage_count == 1)
            .map(|p| p.title)
            .collect();
        assert_eq!(used.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pick_rejects_out_of_range() {
        let ctx = context();
        assert!(cmd_pick(&ctx, "alpha".to_string(), 5).await.is_err());
        assert!(cmd_pick(&ctx, "zzz".to_string(), 0).await.is_err());
    }

    #[test]
    fn test_headless_window() {
        assert!(HeadlessWindow.hide().is_ok());
        assert_eq!(HeadlessWindow.outer_position(), None);
    }
}
