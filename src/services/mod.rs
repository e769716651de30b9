//! Business logic services.
//!
//! Services sit on top of a [`crate::storage::PersistenceGateway`] and provide
//! the operations the CLI and any UI layer call.

mod quick_picker;
pub mod search;
mod settings;
mod store;

pub use quick_picker::{
    Clipboard, CopyOutcome, Key, KeyOutcome, Phase, PickerWindow, QuickPicker,
};
pub use search::{RankedPrompt, rank_prompts};
pub use settings::SettingsService;
pub use store::PromptStore;
