//! In-memory persistence gateway for testing.
//!
//! Holds collections in `RwLock`s and can be told to fail writes, which lets
//! tests observe how the store behaves when persistence breaks.

use super::PersistenceGateway;
use super::filesystem::{BackupData, BackupDocument};
use crate::models::{AppSettings, Folder, Prompt, Tag};
use crate::{Error, Result};
use chrono::Utc;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Which collection a write targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// The prompt collection.
    Prompts,
    /// The folder collection.
    Folders,
    /// The tag collection.
    Tags,
    /// The settings object.
    Settings,
}

/// In-memory gateway.
///
/// Data is not persisted between runs.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    prompts: RwLock<Vec<Prompt>>,
    folders: RwLock<Vec<Folder>>,
    tags: RwLock<Vec<Tag>>,
    settings: RwLock<Option<AppSettings>>,
    backups: RwLock<Vec<BackupDocument>>,
    writes: RwLock<Vec<Collection>>,
    fail_prompt_writes: AtomicBool,
    fail_folder_writes: AtomicBool,
    fail_tag_writes: AtomicBool,
    loads: AtomicUsize,
}

fn poisoned(operation: &str) -> Error {
    Error::operation(operation, "lock poisoned")
}

impl MemoryGateway {
    /// Creates an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gateway pre-seeded with prompts.
    #[must_use]
    pub fn with_prompts(prompts: Vec<Prompt>) -> Self {
        Self {
            prompts: RwLock::new(prompts),
            ..Self::default()
        }
    }

    /// Makes subsequent writes to `collection` fail (or succeed again).
    pub fn fail_writes(&self, collection: Collection, fail: bool) {
        let flag = match collection {
            Collection::Prompts => &self.fail_prompt_writes,
            Collection::Folders => &self.fail_folder_writes,
            Collection::Tags => &self.fail_tag_writes,
            Collection::Settings => return,
        };
        flag.store(fail, Ordering::SeqCst);
    }

    /// Returns every successful write in order.
    #[must_use]
    pub fn writes(&self) -> Vec<Collection> {
        self.writes.read().map(|w| w.clone()).unwrap_or_default()
    }

    /// Number of times the prompt collection was loaded.
    #[must_use]
    pub fn prompt_loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Number of backups taken.
    #[must_use]
    pub fn backup_count(&self) -> usize {
        self.backups.read().map(|b| b.len()).unwrap_or(0)
    }

    fn check(&self, flag: &AtomicBool, operation: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(Error::operation(operation, "injected write failure"));
        }
        Ok(())
    }

    fn record(&self, collection: Collection) -> Result<()> {
        self.writes
            .write()
            .map_err(|_| poisoned("record_write"))?
            .push(collection);
        Ok(())
    }
}

impl PersistenceGateway for MemoryGateway {
    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn load_prompts(&self) -> Result<Vec<Prompt>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let mut prompts = self
            .prompts
            .read()
            .map_err(|_| poisoned("load_prompts"))?
            .clone();
        for prompt in &mut prompts {
            prompt.refresh_variables();
        }
        Ok(prompts)
    }

    fn save_prompts(&self, prompts: &[Prompt]) -> Result<()> {
        self.check(&self.fail_prompt_writes, "write_prompts.json")?;
        *self.prompts.write().map_err(|_| poisoned("save_prompts"))? = prompts.to_vec();
        self.record(Collection::Prompts)
    }

    fn load_folders(&self) -> Result<Vec<Folder>> {
        Ok(self
            .folders
            .read()
            .map_err(|_| poisoned("load_folders"))?
            .clone())
    }

    fn save_folders(&self, folders: &[Folder]) -> Result<()> {
        self.check(&self.fail_folder_writes, "write_folders.json")?;
        *self.folders.write().map_err(|_| poisoned("save_folders"))? = folders.to_vec();
        self.record(Collection::Folders)
    }

    fn load_tags(&self) -> Result<Vec<Tag>> {
        Ok(self.tags.read().map_err(|_| poisoned("load_tags"))?.clone())
    }

    fn save_tags(&self, tags: &[Tag]) -> Result<()> {
        self.check(&self.fail_tag_writes, "write_tags.json")?;
        *self.tags.write().map_err(|_| poisoned("save_tags"))? = tags.to_vec();
        self.record(Collection::Tags)
    }

    fn load_settings(&self) -> Result<Option<AppSettings>> {
        Ok(self
            .settings
            .read()
            .map_err(|_| poisoned("load_settings"))?
            .clone())
    }

    fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        *self
            .settings
            .write()
            .map_err(|_| poisoned("save_settings"))? = Some(settings.clone());
        self.record(Collection::Settings)
    }

    fn create_backup(&self) -> Result<String> {
        let data = BackupData {
            prompts: self.load_prompts()?,
            folders: self.load_folders()?,
            tags: self.load_tags()?,
        };
        let document = BackupDocument::new(data, Utc::now());
        let name = document.file_name();
        self.backups
            .write()
            .map_err(|_| poisoned("create_backup"))?
            .push(document);
        Ok(name)
    }
}
