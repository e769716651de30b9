//! Persistence gateway trait definition.

use crate::Result;
use crate::models::{AppSettings, Folder, Prompt, Tag};

/// Durable storage for the three entity collections and the settings object.
///
/// Every write replaces a whole collection. Two surfaces that share one
/// gateway location stay consistent only by reloading; the last completed
/// write wins.
pub trait PersistenceGateway: Send + Sync {
    /// Prepares the backing location (directories, empty collection files).
    ///
    /// Must be idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be created.
    fn initialize(&self) -> Result<()>;

    /// Loads all prompts.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection exists but cannot be read or parsed.
    fn load_prompts(&self) -> Result<Vec<Prompt>>;

    /// Replaces the stored prompt collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    fn save_prompts(&self, prompts: &[Prompt]) -> Result<()>;

    /// Loads all folders.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection exists but cannot be read or parsed.
    fn load_folders(&self) -> Result<Vec<Folder>>;

    /// Replaces the stored folder collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    fn save_folders(&self, folders: &[Folder]) -> Result<()>;

    /// Loads all tags.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection exists but cannot be read or parsed.
    fn load_tags(&self) -> Result<Vec<Tag>>;

    /// Replaces the stored tag collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    fn save_tags(&self, tags: &[Tag]) -> Result<()>;

    /// Loads the settings object, or `None` if none has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if stored settings cannot be read or parsed.
    fn load_settings(&self) -> Result<Option<AppSettings>>;

    /// Replaces the stored settings object.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be written.
    fn save_settings(&self, settings: &AppSettings) -> Result<()>;

    /// Writes a snapshot of all three collections and returns its name.
    ///
    /// # Errors
    ///
    /// Returns an error if the collections cannot be read or the snapshot written.
    fn create_backup(&self) -> Result<String>;
}
