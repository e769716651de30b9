//! Filesystem-backed persistence gateway.
//!
//! Stores each collection as a pretty-printed JSON array:
//!
//! ```text
//! {base_path}/
//!   prompts.json
//!   folders.json
//!   tags.json
//!   settings.json
//!   backups/backup-2024-05-01T10-00-00-000Z.json
//! ```

use super::PersistenceGateway;
use crate::models::{AppSettings, Folder, Prompt, Tag};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const PROMPTS_FILE: &str = "prompts.json";
const FOLDERS_FILE: &str = "folders.json";
const TAGS_FILE: &str = "tags.json";
const SETTINGS_FILE: &str = "settings.json";
const BACKUP_DIR: &str = "backups";

/// Format version written into backup documents.
pub const BACKUP_VERSION: &str = "1.0";

/// A full snapshot of the entity collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupDocument {
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,
    /// Backup format version.
    pub version: String,
    /// The collections.
    pub data: BackupData,
}

/// Collections inside a [`BackupDocument`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackupData {
    /// All prompts.
    pub prompts: Vec<Prompt>,
    /// All folders.
    pub folders: Vec<Folder>,
    /// All tags.
    pub tags: Vec<Tag>,
}

impl BackupDocument {
    /// Creates a backup document stamped with `now`.
    #[must_use]
    pub fn new(data: BackupData, now: DateTime<Utc>) -> Self {
        Self {
            timestamp: now,
            version: BACKUP_VERSION.to_string(),
            data,
        }
    }

    /// File name used for this backup.
    #[must_use]
    pub fn file_name(&self) -> String {
        let stamp = self
            .timestamp
            .format("%Y-%m-%dT%H-%M-%S-%3fZ")
            .to_string();
        format!("backup-{stamp}.json")
    }
}

/// Filesystem persistence gateway.
pub struct FilesystemGateway {
    /// Base directory for collection files.
    base_path: PathBuf,
}

impl FilesystemGateway {
    /// Creates a gateway rooted at `base_path` and initializes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory tree cannot be created.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let gateway = Self {
            base_path: base_path.into(),
        };
        gateway.initialize()?;
        Ok(gateway)
    }

    /// Returns the default data directory.
    ///
    /// `~/.local/share/promptdock/prompts-data` on Linux, the platform
    /// equivalent elsewhere.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "promptdock")
            .map(|dirs| dirs.data_dir().join("prompts-data"))
    }

    /// Returns the base path.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Returns the backup directory.
    #[must_use]
    pub fn backup_dir(&self) -> PathBuf {
        self.base_path.join(BACKUP_DIR)
    }

    fn path(&self, file: &str) -> PathBuf {
        self.base_path.join(file)
    }

    /// Reads a JSON document, returning `None` if the file does not exist.
    fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>> {
        let path = self.path(file);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| Error::operation(format!("read_{file}"), e))?;
        let value = serde_json::from_str(&content)
            .map_err(|e| Error::operation(format!("parse_{file}"), e))?;
        Ok(Some(value))
    }

    /// Writes a JSON document in full.
    fn write_json<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value)
            .map_err(|e| Error::operation(format!("serialize_{file}"), e))?;

        fs::write(self.path(file), content)
            .map_err(|e| Error::operation(format!("write_{file}"), e))?;

        tracing::debug!(file, "wrote collection");
        metrics::counter!("promptdock_persist_writes_total", "collection" => file.to_string())
            .increment(1);
        Ok(())
    }

    fn load_collection<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        let items: Vec<T> = self.read_json(file)?.unwrap_or_default();
        tracing::debug!(file, count = items.len(), "loaded collection");
        Ok(items)
    }
}

impl PersistenceGateway for FilesystemGateway {
    fn initialize(&self) -> Result<()> {
        fs::create_dir_all(self.backup_dir())
            .map_err(|e| Error::operation("create_data_dir", e))?;

        for file in [PROMPTS_FILE, FOLDERS_FILE, TAGS_FILE] {
            if !self.path(file).exists() {
                self.write_json::<[Prompt]>(file, &[])?;
            }
        }
        Ok(())
    }

    fn load_prompts(&self) -> Result<Vec<Prompt>> {
        let mut prompts: Vec<Prompt> = self.load_collection(PROMPTS_FILE)?;
        for prompt in &mut prompts {
            prompt.refresh_variables();
        }
        Ok(prompts)
    }

    fn save_prompts(&self, prompts: &[Prompt]) -> Result<()> {
        self.write_json(PROMPTS_FILE, prompts)
    }

    fn load_folders(&self) -> Result<Vec<Folder>> {
        self.load_collection(FOLDERS_FILE)
    }

    fn save_folders(&self, folders: &[Folder]) -> Result<()> {
        self.write_json(FOLDERS_FILE, folders)
    }

    fn load_tags(&self) -> Result<Vec<Tag>> {
        self.load_collection(TAGS_FILE)
    }

    fn save_tags(&self, tags: &[Tag]) -> Result<()> {
        self.write_json(TAGS_FILE, tags)
    }

    fn load_settings(&self) -> Result<Option<AppSettings>> {
        self.read_json(SETTINGS_FILE)
    }

    fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        self.write_json(SETTINGS_FILE, settings)
    }

    fn create_backup(&self) -> Result<String> {
        let data = BackupData {
            prompts: self.load_prompts()?,
            folders: self.load_folders()?,
            tags: self.load_tags()?,
        };
        let document = BackupDocument::new(data, Utc::now());
        let name = document.file_name();

        fs::create_dir_all(self.backup_dir())
            .map_err(|e| Error::operation("create_backup_dir", e))?;
        self.write_json(&format!("{BACKUP_DIR}/{name}"), &document)?;

        tracing::info!(backup = %name, "created backup");
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewFolder, NewPrompt, NewTag};
    use tempfile::TempDir;

    fn gateway() -> (TempDir, FilesystemGateway) {
        let dir = TempDir::new().unwrap();
        let gateway = FilesystemGateway::new(dir.path().join("data")).unwrap();
        (dir, gateway)
    }

    #[test]
    fn test_initialize_creates_empty_collections() {
        let (_dir, gateway) = gateway();

        assert!(gateway.base_path().join(PROMPTS_FILE).exists());
        assert!(gateway.base_path().join(FOLDERS_FILE).exists());
        assert!(gateway.base_path().join(TAGS_FILE).exists());
        assert!(gateway.backup_dir().is_dir());
        assert!(gateway.load_prompts().unwrap().is_empty());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let (_dir, gateway) = gateway();
        let prompt = Prompt::create(NewPrompt::new("T", "c"), Utc::now());
        gateway.save_prompts(&[prompt]).unwrap();

        gateway.initialize().unwrap();
        assert_eq!(gateway.load_prompts().unwrap().len(), 1);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let (_dir, gateway) = gateway();
        let now = Utc::now();
        let prompt = Prompt::create(NewPrompt::new("T", "Hi {name}").with_tags(["a"]), now);
        let folder = Folder::create(NewFolder::new("F"), now);
        let tag = Tag::create(NewTag::new("a"), now);

        gateway.save_prompts(std::slice::from_ref(&prompt)).unwrap();
        gateway.save_folders(std::slice::from_ref(&folder)).unwrap();
        gateway.save_tags(std::slice::from_ref(&tag)).unwrap();

        assert_eq!(gateway.load_prompts().unwrap(), vec![prompt]);
        assert_eq!(gateway.load_folders().unwrap(), vec![folder]);
        assert_eq!(gateway.load_tags().unwrap(), vec![tag]);
    }

    #[test]
    fn test_load_rederives_stale_variables() {
        let (_dir, gateway) = gateway();
        let raw = r#"[{
            "id": "p1", "title": "T", "content": "{fresh}",
            "variables": ["stale"], "tags": [],
            "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"
        }]"#;
        fs::write(gateway.base_path().join(PROMPTS_FILE), raw).unwrap();

        let prompts = gateway.load_prompts().unwrap();
        assert_eq!(prompts[0].variables(), ["fresh"]);
    }

    #[test]
    fn test_corrupt_collection_is_an_error() {
        let (_dir, gateway) = gateway();
        fs::write(gateway.base_path().join(PROMPTS_FILE), "{not json").unwrap();

        let err = gateway.load_prompts().unwrap_err();
        assert!(err.to_string().contains("parse_prompts.json"));
    }

    #[test]
    fn test_settings_absent_then_saved() {
        let (_dir, gateway) = gateway();
        assert!(gateway.load_settings().unwrap().is_none());

        let settings = AppSettings::default();
        gateway.save_settings(&settings).unwrap();
        assert_eq!(gateway.load_settings().unwrap(), Some(settings));
    }

    #[test]
    fn test_create_backup_writes_snapshot() {
        let (_dir, gateway) = gateway();
        let prompt = Prompt::create(NewPrompt::new("T", "c"), Utc::now());
        gateway.save_prompts(&[prompt]).unwrap();

        let name = gateway.create_backup().unwrap();
        assert!(name.starts_with("backup-"));
        assert!(std::path::Path::new(&name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json")));

        let content = fs::read_to_string(gateway.backup_dir().join(&name)).unwrap();
        let document: BackupDocument = serde_json::from_str(&content).unwrap();
        assert_eq!(document.version, BACKUP_VERSION);
        assert_eq!(document.data.prompts.len(), 1);
    }

    #[test]
    fn test_write_fails_when_directory_removed() {
        let (_dir, gateway) = gateway();
        fs::remove_dir_all(gateway.base_path()).unwrap();

        let err = gateway.save_tags(&[]).unwrap_err();
        assert!(matches!(err, Error::OperationFailed { .. }));
    }
}
