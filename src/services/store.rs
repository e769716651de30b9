//! The prompt store.
//!
//! [`PromptStore`] keeps prompts, folders, and tags in memory and writes each
//! collection through to a [`PersistenceGateway`] in full after every change.
//!
//! # Consistency
//!
//! Every mutation builds the post-change collection first, hands it to the
//! gateway, and only assigns it in memory once the write succeeded. A failed
//! write therefore leaves the previous collection in place.
//!
//! Operations that touch two collections (deleting a folder or a tag) write
//! them one after the other. If the second write fails the first one stays
//! applied, both on disk and in memory, and the error is returned.
//!
//! # Initialization
//!
//! Collections are loaded on first use. The load runs under the state lock,
//! so concurrent first callers trigger exactly one load.

use crate::io::ImportStrategy;
use crate::models::{
    Folder, FolderPatch, NewFolder, NewPrompt, NewTag, Prompt, PromptPatch, RECENT_WINDOW_DAYS,
    Statistics, Tag, TagPatch,
};
use crate::services::search;
use crate::storage::PersistenceGateway;
use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeSet, HashMap};
use std::hash::BuildHasher;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::instrument;

/// The three collections held in memory.
#[derive(Debug, Default)]
struct Collections {
    prompts: Vec<Prompt>,
    folders: Vec<Folder>,
    tags: Vec<Tag>,
}

/// In-memory entity store with write-through persistence.
pub struct PromptStore {
    gateway: Arc<dyn PersistenceGateway>,
    state: Mutex<Option<Collections>>,
}

impl PromptStore {
    /// Creates a store over a gateway. Nothing is loaded until first use.
    #[must_use]
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            gateway,
            state: Mutex::new(None),
        }
    }

    /// Returns the gateway the store writes through.
    #[must_use]
    pub fn gateway(&self) -> &Arc<dyn PersistenceGateway> {
        &self.gateway
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Collections>>> {
        self.state
            .lock()
            .map_err(|_| Error::operation("lock_store", "lock poisoned"))
    }

    fn load(&self) -> Result<Collections> {
        self.gateway.initialize()?;
        let collections = Collections {
            prompts: self.gateway.load_prompts()?,
            folders: self.gateway.load_folders()?,
            tags: self.gateway.load_tags()?,
        };
        tracing::debug!(
            prompts = collections.prompts.len(),
            folders = collections.folders.len(),
            tags = collections.tags.len(),
            "loaded collections"
        );
        Ok(collections)
    }

    /// Runs `f` against the loaded collections, loading them first if needed.
    fn with_state<T>(&self, f: impl FnOnce(&mut Collections) -> Result<T>) -> Result<T> {
        let mut guard = self.lock()?;
        if guard.is_none() {
            *guard = Some(self.load()?);
        }
        match guard.as_mut() {
            Some(state) => f(state),
            None => Err(Error::operation("load_store", "collections unavailable")),
        }
    }

    /// Loads the collections if they are not loaded yet.
    ///
    /// Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if a collection cannot be read.
    pub fn initialize(&self) -> Result<()> {
        self.with_state(|_| Ok(()))
    }

    /// Drops the in-memory copy and loads every collection again.
    ///
    /// # Errors
    ///
    /// Returns an error if a collection cannot be read. The previous copy is
    /// kept in that case.
    pub fn reload(&self) -> Result<()> {
        let mut guard = self.lock()?;
        *guard = Some(self.load()?);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Prompts
    // ------------------------------------------------------------------

    /// Creates a prompt and persists the prompt collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    #[instrument(skip(self, fields), fields(title = %fields.title))]
    pub fn create_prompt(&self, fields: NewPrompt) -> Result<Prompt> {
        self.with_state(|state| {
            let prompt = Prompt::create(fields, Utc::now());
            let mut prompts = state.prompts.clone();
            prompts.push(prompt.clone());
            self.gateway.save_prompts(&prompts)?;
            state.prompts = prompts;

            tracing::info!(prompt_id = %prompt.id, variables = prompt.variables().len(), "Created prompt");
            Ok(prompt)
        })
    }

    /// Applies a partial update to a prompt.
    ///
    /// Variables are re-derived from the merged content whether or not the
    /// patch touched it. Returns `None` if no prompt has `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    #[instrument(skip(self, patch))]
    pub fn update_prompt(&self, id: &str, patch: PromptPatch) -> Result<Option<Prompt>> {
        self.with_state(|state| {
            let Some(index) = state.prompts.iter().position(|p| p.id == id) else {
                return Ok(None);
            };

            let mut prompts = state.prompts.clone();
            prompts[index].apply(patch, Utc::now());
            let updated = prompts[index].clone();
            self.gateway.save_prompts(&prompts)?;
            state.prompts = prompts;

            tracing::info!(prompt_id = %id, "Updated prompt");
            Ok(Some(updated))
        })
    }

    /// Deletes a prompt. Returns whether it existed.
    ///
    /// Nothing is written when the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    #[instrument(skip(self))]
    pub fn delete_prompt(&self, id: &str) -> Result<bool> {
        self.delete_prompts(&[id]).map(|removed| removed > 0)
    }

    /// Deletes several prompts with a single write. Returns how many existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written; no prompt is
    /// removed from memory in that case.
    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    pub fn delete_prompts<S: AsRef<str>>(&self, ids: &[S]) -> Result<usize> {
        self.with_state(|state| {
            let prompts: Vec<Prompt> = state
                .prompts
                .iter()
                .filter(|p| !ids.iter().any(|id| id.as_ref() == p.id))
                .cloned()
                .collect();

            let removed = state.prompts.len() - prompts.len();
            if removed == 0 {
                return Ok(0);
            }

            self.gateway.save_prompts(&prompts)?;
            state.prompts = prompts;

            tracing::info!(removed, "Deleted prompts");
            Ok(removed)
        })
    }

    /// Records a copy of a prompt and returns the text to place on the
    /// clipboard.
    ///
    /// Increments `usage_count` by one and persists before returning. With
    /// `values` the content is rendered; otherwise it is returned raw.
    /// `updated_at` is left alone. Returns `None` if no prompt has `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written; the usage count
    /// is not incremented in memory in that case.
    #[instrument(skip(self, values))]
    pub fn copy_prompt_content<S: BuildHasher>(
        &self,
        id: &str,
        values: Option<&HashMap<String, String, S>>,
    ) -> Result<Option<String>> {
        self.with_state(|state| {
            let Some(index) = state.prompts.iter().position(|p| p.id == id) else {
                return Ok(None);
            };

            let mut prompts = state.prompts.clone();
            prompts[index].usage_count += 1;
            self.gateway.save_prompts(&prompts)?;
            state.prompts = prompts;

            let prompt = &state.prompts[index];
            let text = values.map_or_else(|| prompt.content().to_string(), |v| prompt.render(v));

            tracing::info!(prompt_id = %id, usage_count = prompt.usage_count, "Copied prompt");
            metrics::counter!("promptdock_prompt_copies_total").increment(1);
            Ok(Some(text))
        })
    }

    /// Returns a prompt by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the collections cannot be loaded.
    pub fn get_prompt(&self, id: &str) -> Result<Option<Prompt>> {
        self.with_state(|state| Ok(state.prompts.iter().find(|p| p.id == id).cloned()))
    }

    /// Returns every prompt in collection order.
    ///
    /// # Errors
    ///
    /// Returns an error if the collections cannot be loaded.
    pub fn get_all_prompts(&self) -> Result<Vec<Prompt>> {
        self.with_state(|state| Ok(state.prompts.clone()))
    }

    /// Returns prompts in a folder, or prompts in no folder for `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the collections cannot be loaded.
    pub fn prompts_in_folder(&self, folder_id: Option<&str>) -> Result<Vec<Prompt>> {
        self.with_state(|state| {
            Ok(state
                .prompts
                .iter()
                .filter(|p| p.folder_id.as_deref() == folder_id)
                .cloned()
                .collect())
        })
    }

    /// Returns prompts carrying no tags.
    ///
    /// # Errors
    ///
    /// Returns an error if the collections cannot be loaded.
    pub fn uncategorized_prompts(&self) -> Result<Vec<Prompt>> {
        self.with_state(|state| {
            Ok(state
                .prompts
                .iter()
                .filter(|p| p.tags.is_empty())
                .cloned()
                .collect())
        })
    }

    /// Filters prompts by text and tags.
    ///
    /// An empty query matches every prompt. Otherwise title, content, or
    /// description must contain the query, ignoring case. A non-empty `tags`
    /// list keeps prompts sharing at least one of them. Collection order is
    /// preserved.
    ///
    /// # Errors
    ///
    /// Returns an error if the collections cannot be loaded.
    pub fn search_prompts(&self, query: &str, tags: &[String]) -> Result<Vec<Prompt>> {
        self.with_state(|state| {
            Ok(state
                .prompts
                .iter()
                .filter(|p| search::matches_filter(p, query, tags))
                .cloned()
                .collect())
        })
    }

    /// Returns the distinct tag names used by prompts, sorted.
    ///
    /// This reads prompts' tag lists, not the tag catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the collections cannot be loaded.
    pub fn get_all_tag_names(&self) -> Result<Vec<String>> {
        self.with_state(|state| {
            let names: BTreeSet<&String> = state.prompts.iter().flat_map(|p| &p.tags).collect();
            Ok(names.into_iter().cloned().collect())
        })
    }

    /// Counts prompts per tag name, most used first, then by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the collections cannot be loaded.
    pub fn tag_usage(&self) -> Result<Vec<(String, usize)>> {
        self.with_state(|state| {
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for tag in state.prompts.iter().flat_map(|p| &p.tags) {
                *counts.entry(tag.as_str()).or_default() += 1;
            }
            let mut usage: Vec<(String, usize)> = counts
                .into_iter()
                .map(|(name, count)| (name.to_string(), count))
                .collect();
            usage.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            Ok(usage)
        })
    }

    /// Returns summary counts as of now.
    ///
    /// # Errors
    ///
    /// Returns an error if the collections cannot be loaded.
    pub fn get_statistics(&self) -> Result<Statistics> {
        self.statistics_at(Utc::now())
    }

    /// Returns summary counts with the recent window ending at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the collections cannot be loaded.
    pub fn statistics_at(&self, now: DateTime<Utc>) -> Result<Statistics> {
        let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
        self.with_state(|state| {
            Ok(Statistics {
                total_prompts: state.prompts.len(),
                total_tags: state.tags.len(),
                total_folders: state.folders.len(),
                total_usage: state.prompts.iter().map(|p| p.usage_count).sum(),
                recently_created: state
                    .prompts
                    .iter()
                    .filter(|p| p.created_at > cutoff)
                    .count(),
                recently_updated: state
                    .prompts
                    .iter()
                    .filter(|p| p.updated_at > cutoff)
                    .count(),
            })
        })
    }

    /// Stores externally supplied prompts with one write.
    ///
    /// [`ImportStrategy::Merge`] replaces prompts with matching ids in place
    /// and appends the rest; [`ImportStrategy::Replace`] swaps the whole
    /// collection. Variables are re-derived for every stored prompt. Returns
    /// the number of prompts taken from `incoming`.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    #[instrument(skip(self, incoming), fields(incoming = incoming.len()))]
    pub fn import_prompts(&self, incoming: Vec<Prompt>, strategy: ImportStrategy) -> Result<usize> {
        self.with_state(|state| {
            let count = incoming.len();
            let mut prompts = match strategy {
                ImportStrategy::Replace => Vec::with_capacity(count),
                ImportStrategy::Merge => state.prompts.clone(),
            };

            for mut prompt in incoming {
                prompt.refresh_variables();
                match prompts.iter_mut().find(|p| p.id == prompt.id) {
                    Some(existing) => *existing = prompt,
                    None => prompts.push(prompt),
                }
            }

            self.gateway.save_prompts(&prompts)?;
            state.prompts = prompts;

            tracing::info!(count, ?strategy, "Imported prompts");
            Ok(count)
        })
    }

    // ------------------------------------------------------------------
    // Folders
    // ------------------------------------------------------------------

    /// Creates a folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    #[instrument(skip(self, fields), fields(name = %fields.name))]
    pub fn create_folder(&self, fields: NewFolder) -> Result<Folder> {
        self.with_state(|state| {
            let folder = Folder::create(fields, Utc::now());
            let mut folders = state.folders.clone();
            folders.push(folder.clone());
            self.gateway.save_folders(&folders)?;
            state.folders = folders;

            tracing::info!(folder_id = %folder.id, "Created folder");
            Ok(folder)
        })
    }

    /// Updates a folder. Returns `None` if no folder has `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    #[instrument(skip(self, patch))]
    pub fn update_folder(&self, id: &str, patch: FolderPatch) -> Result<Option<Folder>> {
        self.with_state(|state| {
            let Some(index) = state.folders.iter().position(|f| f.id == id) else {
                return Ok(None);
            };

            let mut folders = state.folders.clone();
            folders[index].apply(patch, Utc::now());
            let updated = folders[index].clone();
            self.gateway.save_folders(&folders)?;
            state.folders = folders;

            tracing::info!(folder_id = %id, "Updated folder");
            Ok(Some(updated))
        })
    }

    /// Deletes a folder and detaches every prompt that referenced it.
    ///
    /// Detached prompts get a fresh `updated_at`. The folder collection is
    /// written first, then the prompt collection. Returns whether the folder
    /// existed.
    ///
    /// # Errors
    ///
    /// Returns an error if either collection cannot be written.
    #[instrument(skip(self))]
    pub fn delete_folder(&self, id: &str) -> Result<bool> {
        self.with_state(|state| {
            if !state.folders.iter().any(|f| f.id == id) {
                return Ok(false);
            }

            let folders: Vec<Folder> = state.folders.iter().filter(|f| f.id != id).cloned().collect();
            self.gateway.save_folders(&folders)?;
            state.folders = folders;

            let now = Utc::now();
            let mut prompts = state.prompts.clone();
            let mut detached = 0usize;
            for prompt in prompts.iter_mut().filter(|p| p.folder_id.as_deref() == Some(id)) {
                prompt.folder_id = None;
                prompt.updated_at = now;
                detached += 1;
            }
            if detached > 0 {
                self.gateway.save_prompts(&prompts)?;
                state.prompts = prompts;
            }

            tracing::info!(folder_id = %id, detached, "Deleted folder");
            Ok(true)
        })
    }

    /// Returns every folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the collections cannot be loaded.
    pub fn get_all_folders(&self) -> Result<Vec<Folder>> {
        self.with_state(|state| Ok(state.folders.clone()))
    }

    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    /// Creates a tag catalog entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    #[instrument(skip(self, fields), fields(name = %fields.name))]
    pub fn create_tag(&self, fields: NewTag) -> Result<Tag> {
        self.with_state(|state| {
            let tag = Tag::create(fields, Utc::now());
            let mut tags = state.tags.clone();
            tags.push(tag.clone());
            self.gateway.save_tags(&tags)?;
            state.tags = tags;

            tracing::info!(tag_id = %tag.id, "Created tag");
            Ok(tag)
        })
    }

    /// Updates a tag. Returns `None` if no tag has `id`.
    ///
    /// Renaming a tag does not touch prompts that carry the old name.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    #[instrument(skip(self, patch))]
    pub fn update_tag(&self, id: &str, patch: TagPatch) -> Result<Option<Tag>> {
        self.with_state(|state| {
            let Some(index) = state.tags.iter().position(|t| t.id == id) else {
                return Ok(None);
            };

            let mut tags = state.tags.clone();
            tags[index].apply(patch, Utc::now());
            let updated = tags[index].clone();
            self.gateway.save_tags(&tags)?;
            state.tags = tags;

            tracing::info!(tag_id = %id, "Updated tag");
            Ok(Some(updated))
        })
    }

    /// Deletes a tag and strips its name from every prompt that carries it.
    ///
    /// Only affected prompts get a fresh `updated_at`. Returns whether the tag
    /// existed.
    ///
    /// # Errors
    ///
    /// Returns an error if either collection cannot be written.
    #[instrument(skip(self))]
    pub fn delete_tag(&self, id: &str) -> Result<bool> {
        self.with_state(|state| {
            let Some(name) = state.tags.iter().find(|t| t.id == id).map(|t| t.name.clone()) else {
                return Ok(false);
            };

            let tags: Vec<Tag> = state.tags.iter().filter(|t| t.id != id).cloned().collect();
            self.gateway.save_tags(&tags)?;
            state.tags = tags;

            let now = Utc::now();
            let mut prompts = state.prompts.clone();
            let mut stripped = 0usize;
            for prompt in prompts.iter_mut().filter(|p| p.has_tag(&name)) {
                prompt.tags.retain(|t| *t != name);
                prompt.updated_at = now;
                stripped += 1;
            }
            if stripped > 0 {
                self.gateway.save_prompts(&prompts)?;
                state.prompts = prompts;
            }

            tracing::info!(tag_id = %id, tag = %name, stripped, "Deleted tag");
            Ok(true)
        })
    }

    /// Returns every tag catalog entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the collections cannot be loaded.
    pub fn get_all_tags(&self) -> Result<Vec<Tag>> {
        self.with_state(|state| Ok(state.tags.clone()))
    }

    /// Writes a snapshot of the persisted collections. Returns its name.
    ///
    /// # Errors
    ///
    /// Returns an error if the backup cannot be written.
    pub fn create_backup(&self) -> Result<String> {
        self.gateway.create_backup()
    }
}
