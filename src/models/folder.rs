//! Folder models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named container for prompts.
///
/// Deleting a folder never deletes its prompts; they become uncategorized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Builds a folder from creation fields, assigning an id and timestamps.
    #[must_use]
    pub fn create(fields: NewFolder, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: fields.name,
            description: fields.description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges a patch and stamps `updated_at`.
    pub fn apply(&mut self, patch: FolderPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        self.updated_at = now;
    }
}

/// Fields supplied when creating a folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewFolder {
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

impl NewFolder {
    /// Creates folder fields with a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A partial update to a folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderPatch {
    /// New name.
    pub name: Option<String>,
    /// New description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
}

impl FolderPatch {
    /// Creates a patch that renames the folder.
    #[must_use]
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            description: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_rename() {
        let created = Utc::now();
        let mut folder = Folder::create(NewFolder::new("Work").with_description("Job"), created);
        assert_eq!(folder.created_at, folder.updated_at);

        let later = created + chrono::Duration::seconds(5);
        folder.apply(FolderPatch::rename("Office"), later);

        assert_eq!(folder.name, "Office");
        assert_eq!(folder.description.as_deref(), Some("Job"));
        assert_eq!(folder.created_at, created);
        assert_eq!(folder.updated_at, later);
    }
}
