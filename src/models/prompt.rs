//! Prompt models.
//!
//! Provides the [`Prompt`] record together with the two pure text operations
//! every prompt depends on: variable extraction and content rendering.
//!
//! # Placeholder Syntax
//!
//! A placeholder is `{name}`. The name is everything between a `{` and the next
//! `}`, trimmed of surrounding whitespace.
//!
//! | Content | Extracted |
//! |---------|-----------|
//! | `Hello {name}` | `["name"]` |
//! | `{a}{b}{a}` | `["a", "b"]` |
//! | `{ spaced }` | `["spaced"]` |
//! | `{}` | `[]` |
//! | `{{a}}` | `["{a"]` |
//!
//! There is no escape sequence. A literal `{` always starts a potential
//! placeholder, which keeps exported data compatible with other readers of the
//! same files.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::hash::BuildHasher;
use std::sync::LazyLock;

/// Creates a compile-time verified regex wrapped in [`LazyLock`].
macro_rules! lazy_regex {
    ($pattern:expr) => {
        LazyLock::new(|| Regex::new($pattern).unwrap_or_else(|_| unreachable!()))
    };
}

/// A `{`, then at least one non-`}` character, then `}`.
static PLACEHOLDER_PATTERN: LazyLock<Regex> = lazy_regex!(r"\{([^}]+)\}");

/// Extracts variable names from prompt content.
///
/// Scans left to right for `{name}` placeholders and returns the trimmed names
/// in order of first appearance, without duplicates. Empty names are skipped.
///
/// # Examples
///
/// ```
/// use promptdock::extract_variables;
///
/// assert_eq!(extract_variables("{a}{b}{a}"), vec!["a", "b"]);
/// assert!(extract_variables("no vars here").is_empty());
/// assert!(extract_variables("{}").is_empty());
/// ```
#[must_use]
pub fn extract_variables(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut variables = Vec::new();

    for cap in PLACEHOLDER_PATTERN.captures_iter(content) {
        let Some(inner) = cap.get(1) else {
            continue;
        };
        let name = inner.as_str().trim();
        if name.is_empty() {
            continue;
        }
        if seen.insert(name) {
            variables.push(name.to_string());
        }
    }

    variables
}

/// Renders prompt content with the supplied variable values.
///
/// Every occurrence of `{key}` is replaced with its value. Keys are visited
/// once each, in ascending order, and each key gets one global replace. Values
/// are never rescanned for further substitution against keys already visited.
/// Placeholders with no supplied value stay in the output as literal text.
///
/// # Examples
///
/// ```
/// use promptdock::render_content;
/// use std::collections::HashMap;
///
/// let values = HashMap::from([("name".to_string(), "Ann".to_string())]);
/// assert_eq!(
///     render_content("Hello {name}, you are {age}", &values),
///     "Hello Ann, you are {age}"
/// );
/// ```
#[must_use]
pub fn render_content<S: BuildHasher>(content: &str, values: &HashMap<String, String, S>) -> String {
    let mut keys: Vec<&String> = values.keys().collect();
    keys.sort();

    let mut rendered = content.to_string();
    for key in keys {
        let placeholder = format!("{{{key}}}");
        if let Some(value) = values.get(key) {
            if rendered.contains(&placeholder) {
                rendered = rendered.replace(&placeholder, value);
            }
        }
    }
    rendered
}

/// A reusable text prompt.
///
/// `content` and `variables` are only reachable through accessors: variables
/// are derived from content and are recomputed every time content changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    /// Unique identifier, assigned at creation.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Prompt text with `{variable}` placeholders.
    content: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Variable names derived from `content`.
    #[serde(default)]
    variables: Vec<String>,
    /// Tag names (matched by name, not by tag id).
    #[serde(default)]
    pub tags: Vec<String>,
    /// Containing folder, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    /// Number of successful copies.
    #[serde(default)]
    pub usage_count: u64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl Prompt {
    /// Builds a fresh prompt from creation fields.
    ///
    /// Assigns a new id, derives variables, zeroes the usage count, and stamps
    /// both timestamps with `now`.
    #[must_use]
    pub fn create(fields: NewPrompt, now: DateTime<Utc>) -> Self {
        let variables = extract_variables(&fields.content);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: fields.title,
            content: fields.content,
            description: fields.description,
            variables,
            tags: fields.tags,
            folder_id: fields.folder_id,
            usage_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds a prompt from externally supplied parts.
    ///
    /// Used by import and by tests that need fixed ids or timestamps. Variables
    /// are always derived from `content`.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        description: Option<String>,
        tags: Vec<String>,
        folder_id: Option<String>,
        usage_count: u64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let content = content.into();
        Self {
            id: id.into(),
            title: title.into(),
            variables: extract_variables(&content),
            content,
            description,
            tags,
            folder_id,
            usage_count,
            created_at,
            updated_at,
        }
    }

    /// Returns the prompt text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the variable names derived from the content.
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Replaces the content and re-derives variables.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.refresh_variables();
    }

    /// Recomputes variables from the current content.
    ///
    /// Records read back from disk or an import may carry a stale list.
    pub fn refresh_variables(&mut self) {
        self.variables = extract_variables(&self.content);
    }

    /// Returns true if the prompt carries the given tag name.
    #[must_use]
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t == name)
    }

    /// Renders the content with the given values.
    #[must_use]
    pub fn render<S: BuildHasher>(&self, values: &HashMap<String, String, S>) -> String {
        render_content(&self.content, values)
    }

    /// Merges a patch, re-derives variables from the merged content, and
    /// stamps `updated_at`.
    pub fn apply(&mut self, patch: PromptPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(folder_id) = patch.folder_id {
            self.folder_id = folder_id;
        }
        self.refresh_variables();
        self.updated_at = now;
    }
}

/// Fields supplied when creating a prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPrompt {
    /// Display title.
    pub title: String,
    /// Prompt text.
    pub content: String,
    /// Optional description.
    pub description: Option<String>,
    /// Tag names.
    pub tags: Vec<String>,
    /// Containing folder.
    pub folder_id: Option<String>,
}

impl NewPrompt {
    /// Creates creation fields with a title and content.
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Places the prompt in a folder.
    #[must_use]
    pub fn in_folder(mut self, folder_id: impl Into<String>) -> Self {
        self.folder_id = Some(folder_id.into());
        self
    }
}

/// A partial update to a prompt.
///
/// `None` leaves a field untouched. For optional fields the inner `Option`
/// is the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptPatch {
    /// New title.
    pub title: Option<String>,
    /// New content.
    pub content: Option<String>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New tag list.
    pub tags: Option<Vec<String>>,
    /// New folder reference.
    pub folder_id: Option<Option<String>>,
}

impl PromptPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the content.
    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Sets or clears the description.
    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Replaces the tags.
    #[must_use]
    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Moves the prompt into a folder, or out of any folder with `None`.
    #[must_use]
    pub fn folder(mut self, folder_id: Option<String>) -> Self {
        self.folder_id = Some(folder_id);
        self
    }

    /// Returns true if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.description.is_none()
            && self.tags.is_none()
            && self.folder_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("{a}{b}{a}", &["a", "b"] ; "dedup keeps first occurrence")]
    #[test_case("no vars here", &[] ; "plain text")]
    #[test_case("{}", &[] ; "empty braces")]
    #[test_case("{ }", &[] ; "whitespace only")]
    #[test_case("Hi { name }!", &["name"] ; "trims whitespace")]
    #[test_case("{{a}}", &["{a"] ; "nested opening brace kept")]
    #[test_case("{first name} and {last-name}", &["first name", "last-name"] ; "any characters")]
    #[test_case("open { never closed", &[] ; "unclosed")]
    #[test_case("{b}{a}", &["b", "a"] ; "order of appearance")]
    fn test_extract_variables(content: &str, expected: &[&str]) {
        assert_eq!(extract_variables(content), expected);
    }

    #[test]
    fn test_extract_variables_multiline() {
        let content = "Line one {x}\nLine two {y}\n{x} again";
        assert_eq!(extract_variables(content), vec!["x", "y"]);
    }

    #[test]
    fn test_extract_variables_is_idempotent() {
        let content = "Write a {tone} email about {topic}";
        assert_eq!(extract_variables(content), extract_variables(content));
    }

    #[test]
    fn test_render_leaves_unmapped_literal() {
        let values = HashMap::from([("name".to_string(), "Ann".to_string())]);
        assert_eq!(
            render_content("Hello {name}, you are {age}", &values),
            "Hello Ann, you are {age}"
        );
    }

    #[test]
    fn test_render_replaces_all_occurrences() {
        let values = HashMap::from([("x".to_string(), "1".to_string())]);
        assert_eq!(render_content("{x}+{x}={x}{x}", &values), "1+1=11");
    }

    #[test]
    fn test_render_empty_mapping_is_identity() {
        let values: HashMap<String, String> = HashMap::new();
        assert_eq!(render_content("{a} {b}", &values), "{a} {b}");
    }

    #[test]
    fn test_render_does_not_match_padded_placeholder() {
        // Keys match literally, so `{ name }` is not `{name}`.
        let values = HashMap::from([("name".to_string(), "Ann".to_string())]);
        assert_eq!(render_content("{ name }", &values), "{ name }");
    }

    #[test]
    fn test_render_value_with_special_characters() {
        let values = HashMap::from([("v".to_string(), "$1 \\n (.*)".to_string())]);
        assert_eq!(render_content("[{v}]", &values), "[$1 \\n (.*)]");
    }

    #[test]
    fn test_render_is_single_pass_per_key() {
        // "a" is visited first; its value introduces `{b}`, which the later
        // visit of "b" replaces. The reverse never happens.
        let values = HashMap::from([
            ("a".to_string(), "{b}".to_string()),
            ("b".to_string(), "{a}".to_string()),
        ]);
        assert_eq!(render_content("{a}", &values), "{a}");
        assert_eq!(render_content("{b}", &values), "{a}");
    }

    #[test]
    fn test_create_derives_variables() {
        let now = Utc::now();
        let prompt = Prompt::create(NewPrompt::new("Email", "Write a {tone} email about {topic}"), now);

        assert_eq!(prompt.variables(), ["tone", "topic"]);
        assert_eq!(prompt.usage_count, 0);
        assert_eq!(prompt.created_at, now);
        assert_eq!(prompt.updated_at, now);
        assert!(!prompt.id.is_empty());
    }

    #[test]
    fn test_apply_rederives_variables_without_content_change() {
        let now = Utc::now();
        let mut prompt = Prompt::from_parts(
            "p1", "T", "{a} {b}", None, vec![], None, 0, now, now,
        );
        prompt.variables = vec!["stale".to_string()];

        prompt.apply(PromptPatch::new().title("New"), now);
        assert_eq!(prompt.variables(), ["a", "b"]);
        assert_eq!(prompt.title, "New");
    }

    #[test]
    fn test_apply_clears_optional_fields() {
        let now = Utc::now();
        let mut prompt = Prompt::create(
            NewPrompt::new("T", "c")
                .with_description("d")
                .in_folder("f1"),
            now,
        );

        prompt.apply(PromptPatch::new().description(None).folder(None), now);
        assert!(prompt.description.is_none());
        assert!(prompt.folder_id.is_none());
    }

    #[test]
    fn test_serialization_uses_camel_case() {
        let now = Utc::now();
        let prompt = Prompt::create(NewPrompt::new("T", "{x}").in_folder("f"), now);
        let json = serde_json::to_value(&prompt).unwrap();

        assert!(json.get("folderId").is_some());
        assert!(json.get("usageCount").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("description").is_none());
        assert_eq!(json["variables"], serde_json::json!(["x"]));
    }

    #[test]
    fn test_deserialize_defaults_usage_count() {
        let json = r#"{
            "id": "p1",
            "title": "T",
            "content": "c",
            "tags": [],
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }"#;
        let prompt: Prompt = serde_json::from_str(json).unwrap();
        assert_eq!(prompt.usage_count, 0);
        assert!(prompt.variables().is_empty());
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(PromptPatch::new().is_empty());
        assert!(!PromptPatch::new().title("x").is_empty());
    }
}
