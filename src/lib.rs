//! # Promptdock
//!
//! A snippet manager for reusable text prompts.
//!
//! Prompts are free text with `{name}` placeholders. They can be tagged, filed
//! into folders, searched, and copied with variables filled in. A lightweight
//! quick picker ranks prompts as the user types and copies the selected one.
//!
//! ## Features
//!
//! - Variable extraction and single-pass substitution
//! - In-memory entity store with write-through JSON persistence
//! - Cascading folder/tag deletes that keep prompt references consistent
//! - Ranked search shared by the main listing and the quick picker
//! - JSON import, JSON/CSV/Markdown export, timestamped backups
//!
//! ## Example
//!
//! ```rust,no_run
//! use promptdock::models::NewPrompt;
//! use promptdock::services::PromptStore;
//! use promptdock::storage::FilesystemGateway;
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! let gateway = Arc::new(FilesystemGateway::new("/tmp/promptdock")?);
//! let store = PromptStore::new(gateway);
//! let prompt = store.create_prompt(NewPrompt::new("Email", "Write a {tone} email"))?;
//!
//! let values = HashMap::from([("tone".to_string(), "formal".to_string())]);
//! let text = store.copy_prompt_content(&prompt.id, Some(&values))?;
//! assert_eq!(text.as_deref(), Some("Write a formal email"));
//! # Ok::<(), promptdock::Error>(())
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod cli;
pub mod config;
pub mod io;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

// Re-exports for convenience
pub use config::{PromptdockConfig, QuickPickerConfig};
pub use models::{
    AppSettings, Folder, NewFolder, NewPrompt, NewTag, Prompt, PromptPatch, Statistics, Tag,
    extract_variables, render_content,
};
pub use services::{PromptStore, QuickPicker, SettingsService, rank_prompts};
pub use storage::{FilesystemGateway, MemoryGateway, PersistenceGateway};

/// Error type for promptdock operations.
///
/// Absence of a prompt, folder, or tag is not an error at the store layer:
/// lookups and mutations report it as `None`, `false`, or a zero count.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Malformed import documents, invalid shortcut strings, empty titles |
/// | `OperationFailed` | File reads/writes fail, JSON cannot be parsed, a lock is poisoned |
/// | `NotFound` | The CLI resolves an id that does not exist |
/// | `Clipboard` | The system clipboard rejects a write |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - A collection or settings file cannot be read, parsed, or written
    /// - The backup directory cannot be created
    /// - Store state is unavailable because a lock was poisoned
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Writing to the clipboard failed.
    #[error("clipboard error: {0}")]
    Clipboard(String),
}

impl Error {
    /// Builds an [`Error::OperationFailed`] from an operation name and any displayable cause.
    pub fn operation(operation: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::OperationFailed {
            operation: operation.into(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for promptdock operations.
pub type Result<T> = std::result::Result<T, Error>;
