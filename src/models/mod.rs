//! Data models for promptdock.
//!
//! This module contains the records the store owns and the value types the
//! services exchange.

mod folder;
mod prompt;
mod settings;
mod stats;
mod tag;

pub use folder::{Folder, FolderPatch, NewFolder};
pub use prompt::{NewPrompt, Prompt, PromptPatch, extract_variables, render_content};
pub use settings::{
    AppSettings, AppearanceSettings, DEFAULT_QUICK_PICKER_SHORTCUT, GeneralSettings,
    GlobalShortcutSettings, Modifier, QuickPickerSettings, Shortcut, Theme, WindowPosition,
};
pub use stats::{RECENT_WINDOW_DAYS, Statistics};
pub use tag::{NewTag, Tag, TagPatch};
