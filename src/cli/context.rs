//! Shared state for CLI commands.

use crate::config::PromptdockConfig;
use crate::models::{Folder, Prompt, Tag};
use crate::services::{PromptStore, SettingsService};
use crate::storage::{FilesystemGateway, PersistenceGateway};
use crate::{Error, Result};
use std::sync::Arc;

/// Services opened once per CLI invocation.
pub struct CliContext {
    /// Effective configuration.
    pub config: PromptdockConfig,
    /// Entity store.
    pub store: Arc<PromptStore>,
    /// Settings service.
    pub settings: Arc<SettingsService>,
}

impl CliContext {
    /// Opens the filesystem gateway under `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be initialized.
    pub fn open(config: PromptdockConfig) -> Result<Self> {
        let gateway: Arc<dyn PersistenceGateway> =
            Arc::new(FilesystemGateway::new(config.data_dir.clone())?);
        Ok(Self::with_gateway(config, gateway))
    }

    /// Builds a context over any gateway.
    #[must_use]
    pub fn with_gateway(config: PromptdockConfig, gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            store: Arc::new(PromptStore::new(Arc::clone(&gateway))),
            settings: Arc::new(SettingsService::new(gateway)),
            config,
        }
    }

    /// Looks up a prompt, reporting absence as [`Error::NotFound`].
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt does not exist or the store cannot load.
    pub fn require_prompt(&self, id: &str) -> Result<Prompt> {
        self.store
            .get_prompt(id)?
            .ok_or_else(|| Error::NotFound(format!("prompt {id}")))
    }

    /// Looks up a folder by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder does not exist or the store cannot load.
    pub fn require_folder(&self, id: &str) -> Result<Folder> {
        self.store
            .get_all_folders()?
            .into_iter()
            .find(|f| f.id == id)
            .ok_or_else(|| Error::NotFound(format!("folder {id}")))
    }

    /// Looks up a tag by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag does not exist or the store cannot load.
    pub fn require_tag(&self, id: &str) -> Result<Tag> {
        self.store
            .get_all_tags()?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(format!("tag {id}")))
    }
}
