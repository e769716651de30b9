//! Tag models.
//!
//! Prompts reference tags by name. The [`Tag`] collection is a catalog of
//! known names with optional presentation metadata; renaming a catalog entry
//! does not rewrite prompts that already carry the old name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tag catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Unique identifier.
    pub id: String,
    /// Tag name, the identity prompts match on.
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional display color (for example `#ff8800`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl Tag {
    /// Builds a tag from creation fields, assigning an id and timestamps.
    #[must_use]
    pub fn create(fields: NewTag, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: fields.name,
            description: fields.description,
            color: fields.color,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges a patch and stamps `updated_at`.
    pub fn apply(&mut self, patch: TagPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        self.updated_at = now;
    }
}

/// Fields supplied when creating a tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTag {
    /// Tag name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional color.
    pub color: Option<String>,
}

impl NewTag {
    /// Creates tag fields with a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the color.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A partial update to a tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPatch {
    /// New name.
    pub name: Option<String>,
    /// New description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
    /// New color; `Some(None)` clears it.
    pub color: Option<Option<String>>,
}

impl TagPatch {
    /// Creates a patch that renames the tag.
    #[must_use]
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_roundtrip_omits_absent_fields() {
        let tag = Tag::create(NewTag::new("writing"), Utc::now());
        let json = serde_json::to_value(&tag).unwrap();

        assert_eq!(json["name"], "writing");
        assert!(json.get("color").is_none());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_apply_clears_color() {
        let now = Utc::now();
        let mut tag = Tag::create(NewTag::new("x").with_color("#fff"), now);
        tag.apply(
            TagPatch {
                color: Some(None),
                ..Default::default()
            },
            now,
        );
        assert!(tag.color.is_none());
        assert_eq!(tag.name, "x");
    }
}
