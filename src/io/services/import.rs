//! Prompt import service.
//!
//! Accepts a JSON array of prompt-shaped objects produced elsewhere. Each
//! record must carry `id`, `title`, and `content`; everything else defaults.
//! Invalid records are reported and skipped, the rest are stored in one write.

use crate::models::Prompt;
use crate::services::PromptStore;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::instrument;

const REQUIRED_FIELDS: [&str; 3] = ["id", "title", "content"];

/// How imported prompts combine with the existing collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportStrategy {
    /// Replace prompts with matching ids in place, append the rest.
    #[default]
    Merge,
    /// Replace the whole collection.
    Replace,
}

/// Result of an import operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    /// True when at least one prompt was stored.
    pub success: bool,
    /// Number of prompts stored.
    pub imported_count: usize,
    /// One message per skipped record or document-level failure.
    pub errors: Vec<String>,
    /// Number of imported ids that already existed.
    pub duplicates: usize,
}

/// Summary of one record in an [`ImportPreview`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewPrompt {
    /// Prompt id.
    pub id: String,
    /// Prompt title.
    pub title: String,
    /// Tag names.
    pub tags: Vec<String>,
    /// Creation time after defaulting.
    pub created_at: DateTime<Utc>,
}

/// Dry-run report for an import document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    /// True when the document parsed and every record is valid.
    pub valid: bool,
    /// Valid records.
    pub prompts: Vec<PreviewPrompt>,
    /// Validation messages.
    pub errors: Vec<String>,
    /// Titles of records whose id already exists.
    pub duplicates: Vec<String>,
}

/// Records parsed out of an import document.
#[derive(Debug, Default)]
pub struct ParsedImport {
    /// Valid prompts, in document order.
    pub prompts: Vec<Prompt>,
    /// One message per skipped record.
    pub errors: Vec<String>,
}

/// Parses an import document.
///
/// `now` fills in absent or unparseable timestamps.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the text is not JSON or not an array.
pub fn parse_document(json: &str, now: DateTime<Utc>) -> Result<ParsedImport> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| Error::InvalidInput(format!("Invalid JSON format: {e}")))?;

    let Value::Array(items) = value else {
        return Err(Error::InvalidInput(
            "Invalid JSON format: expected an array of prompts".to_string(),
        ));
    };

    let mut parsed = ParsedImport::default();
    for (index, item) in items.iter().enumerate() {
        match parse_record(item, now) {
            Ok(prompt) => parsed.prompts.push(prompt),
            Err(missing) => parsed.errors.push(format!(
                "Invalid prompt at index {index}: missing required fields ({})",
                missing.join(", ")
            )),
        }
    }
    Ok(parsed)
}

/// Builds a prompt from one record, or returns the missing required fields.
fn parse_record(item: &Value, now: DateTime<Utc>) -> std::result::Result<Prompt, Vec<&'static str>> {
    let empty = Map::new();
    let fields = item.as_object().unwrap_or(&empty);

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .into_iter()
        .filter(|name| non_empty_str(fields, name).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(missing);
    }

    let id = non_empty_str(fields, "id").unwrap_or_default();
    let title = non_empty_str(fields, "title").unwrap_or_default();
    let content = non_empty_str(fields, "content").unwrap_or_default();

    let description = fields
        .get("description")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty())
        .map(ToString::to_string);
    let tags = fields
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default();
    let folder_id = fields
        .get("folderId")
        .and_then(Value::as_str)
        .map(ToString::to_string);
    let usage_count = fields
        .get("usageCount")
        .and_then(Value::as_u64)
        .unwrap_or(0);

    Ok(Prompt::from_parts(
        id,
        title,
        content,
        description,
        tags,
        folder_id,
        usage_count,
        timestamp(fields, "createdAt", now),
        timestamp(fields, "updatedAt", now),
    ))
}

fn non_empty_str<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn timestamp(fields: &Map<String, Value>, name: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map_or(now, |dt| dt.with_timezone(&Utc))
}

/// Service for importing prompts into a [`PromptStore`].
pub struct ImportService {
    store: Arc<PromptStore>,
}

impl ImportService {
    /// Creates a new import service.
    #[must_use]
    pub const fn new(store: Arc<PromptStore>) -> Self {
        Self { store }
    }

    /// Validates a document without storing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the existing prompts cannot be loaded.
    pub fn preview(&self, json: &str) -> Result<ImportPreview> {
        let parsed = match parse_document(json, Utc::now()) {
            Ok(parsed) => parsed,
            Err(e) => {
                return Ok(ImportPreview {
                    errors: vec![invalid_input_message(e)],
                    ..ImportPreview::default()
                });
            },
        };

        let existing = self.existing_ids()?;
        let duplicates = parsed
            .prompts
            .iter()
            .filter(|p| existing.contains(&p.id))
            .map(|p| p.title.clone())
            .collect();
        let prompts = parsed
            .prompts
            .into_iter()
            .map(|p| PreviewPrompt {
                id: p.id,
                title: p.title,
                tags: p.tags,
                created_at: p.created_at,
            })
            .collect();

        Ok(ImportPreview {
            valid: parsed.errors.is_empty(),
            prompts,
            errors: parsed.errors,
            duplicates,
        })
    }

    /// Imports prompts from a JSON document.
    ///
    /// Malformed documents and invalid records are reported in the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompts collection cannot be read or written.
    #[instrument(skip(self, json), fields(bytes = json.len()))]
    pub fn import_json(&self, json: &str, strategy: ImportStrategy) -> Result<ImportResult> {
        let parsed = match parse_document(json, Utc::now()) {
            Ok(parsed) => parsed,
            Err(e) => {
                return Ok(ImportResult {
                    errors: vec![invalid_input_message(e)],
                    ..ImportResult::default()
                });
            },
        };

        let mut errors = parsed.errors;
        if parsed.prompts.is_empty() {
            errors.push("No valid prompts found in import data".to_string());
            tracing::warn!(errors = errors.len(), "Import contained no valid prompts");
            return Ok(ImportResult {
                errors,
                ..ImportResult::default()
            });
        }

        let existing = self.existing_ids()?;
        let duplicates = parsed
            .prompts
            .iter()
            .filter(|p| existing.contains(&p.id))
            .count();

        let imported_count = self.store.import_prompts(parsed.prompts, strategy)?;

        tracing::info!(
            imported_count,
            duplicates,
            skipped = errors.len(),
            "Import completed"
        );

        Ok(ImportResult {
            success: true,
            imported_count,
            errors,
            duplicates,
        })
    }

    /// Imports prompts from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the store cannot be written.
    pub fn import_file(&self, path: impl AsRef<Path>, strategy: ImportStrategy) -> Result<ImportResult> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::operation(format!("read_import_file {}", path.display()), e))?;
        self.import_json(&json, strategy)
    }

    fn existing_ids(&self) -> Result<HashSet<String>> {
        Ok(self
            .store
            .get_all_prompts()?
            .into_iter()
            .map(|p| p.id)
            .collect())
    }
}

fn invalid_input_message(error: Error) -> String {
    match error {
        Error::InvalidInput(message) => message,
        other => other.to_string(),
    }
}
