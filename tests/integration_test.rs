//! Integration tests for promptdock.
//!
//! Every test runs against a [`FilesystemGateway`] in a temporary directory,
//! and most reopen the directory with a second store to check what reached disk.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::too_many_lines)]

use chrono::{TimeZone, Utc};
use promptdock::io::{Format, ImportService, ImportStrategy, export_to_file};
use promptdock::models::{NewFolder, NewPrompt, NewTag, Prompt, PromptPatch};
use promptdock::services::{PromptStore, SettingsService};
use promptdock::storage::{BackupDocument, FilesystemGateway};
use promptdock::{Error, rank_prompts};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

fn open(dir: &TempDir) -> Arc<PromptStore> {
    let gateway = FilesystemGateway::new(dir.path()).unwrap();
    Arc::new(PromptStore::new(Arc::new(gateway)))
}

fn dated(id: &str, title: &str, content: &str, tags: &[&str], folder: Option<&str>) -> Prompt {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Prompt::from_parts(
        id,
        title,
        content,
        None,
        tags.iter().map(ToString::to_string).collect(),
        folder.map(ToString::to_string),
        0,
        at,
        at,
    )
}

#[test]
fn test_error_types() {
    let err = Error::InvalidInput("test message".to_string());
    let display = format!("{err}");
    assert!(display.contains("invalid input"));
    assert!(display.contains("test message"));

    let err = Error::operation("write_prompts.json", "disk full");
    let display = format!("{err}");
    assert!(display.contains("write_prompts.json"));
    assert!(display.contains("disk full"));
}

#[test]
fn test_create_and_copy_scenario() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);

    let prompt = store
        .create_prompt(NewPrompt::new("Email", "Write a {tone} email about {topic}"))
        .unwrap();
    assert_eq!(prompt.variables(), ["tone", "topic"]);
    assert_eq!(prompt.usage_count, 0);

    let values = HashMap::from([
        ("tone".to_string(), "formal".to_string()),
        ("topic".to_string(), "budget".to_string()),
    ]);
    let text = store.copy_prompt_content(&prompt.id, Some(&values)).unwrap();
    assert_eq!(text.as_deref(), Some("Write a formal email about budget"));

    let reopened = open(&dir);
    let stored = reopened.get_prompt(&prompt.id).unwrap().unwrap();
    assert_eq!(stored.usage_count, 1);
    assert_eq!(stored.variables(), ["tone", "topic"]);
}

#[test]
fn test_copy_counts_only_the_copied_prompt() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let a = store.create_prompt(NewPrompt::new("A", "a")).unwrap();
    let b = store.create_prompt(NewPrompt::new("B", "b")).unwrap();

    for _ in 0..5 {
        store
            .copy_prompt_content::<std::hash::RandomState>(&a.id, None)
            .unwrap();
    }

    let reopened = open(&dir);
    assert_eq!(reopened.get_prompt(&a.id).unwrap().unwrap().usage_count, 5);
    assert_eq!(reopened.get_prompt(&b.id).unwrap().unwrap().usage_count, 0);
}

#[test]
fn test_update_rederives_variables() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let prompt = store.create_prompt(NewPrompt::new("T", "{old}")).unwrap();

    let updated = store
        .update_prompt(&prompt.id, PromptPatch::new().content("{x} and {y} and {x}"))
        .unwrap()
        .unwrap();
    assert_eq!(updated.variables(), ["x", "y"]);

    let reopened = open(&dir);
    assert_eq!(
        reopened.get_prompt(&prompt.id).unwrap().unwrap().variables(),
        ["x", "y"]
    );
}

#[test]
fn test_delete_folder_detaches_prompts() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let folder = store.create_folder(NewFolder::new("Work")).unwrap();
    store
        .import_prompts(
            vec![
                dated("p1", "One", "1", &[], Some(&folder.id)),
                dated("p2", "Two", "2", &[], Some(&folder.id)),
                dated("p3", "Three", "3", &[], None),
            ],
            ImportStrategy::Replace,
        )
        .unwrap();
    let before = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    assert!(store.delete_folder(&folder.id).unwrap());

    let reopened = open(&dir);
    let prompts = reopened.get_all_prompts().unwrap();
    assert!(prompts.iter().all(|p| p.folder_id.is_none()));
    for id in ["p1", "p2"] {
        let prompt = prompts.iter().find(|p| p.id == id).unwrap();
        assert!(prompt.updated_at > before);
    }
    let untouched = prompts.iter().find(|p| p.id == "p3").unwrap();
    assert_eq!(untouched.updated_at, before);
    assert!(reopened.get_all_folders().unwrap().is_empty());
}

#[test]
fn test_delete_tag_strips_name_from_prompts() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let tag = store.create_tag(NewTag::new("x")).unwrap();
    store
        .import_prompts(
            vec![
                dated("p1", "One", "1", &["x"], None),
                dated("p2", "Two", "2", &["x", "y"], None),
                dated("p3", "Three", "3", &["y", "x"], None),
            ],
            ImportStrategy::Replace,
        )
        .unwrap();

    assert!(store.delete_tag(&tag.id).unwrap());

    let reopened = open(&dir);
    let prompts = reopened.get_all_prompts().unwrap();
    assert!(prompts.iter().all(|p| !p.has_tag("x")));
    assert_eq!(reopened.get_all_tag_names().unwrap(), ["y"]);
}

#[test]
fn test_search_listing_semantics() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store
        .import_prompts(
            vec![
                dated("p1", "One", "1", &["x"], None),
                dated("p2", "Two", "2", &["y"], None),
                dated("p3", "Three", "3", &["z"], None),
                dated("p4", "Four", "4", &["x", "y"], None),
            ],
            ImportStrategy::Replace,
        )
        .unwrap();

    let all: Vec<_> = store
        .search_prompts("", &[])
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(all, ["p1", "p2", "p3", "p4"]);

    let either: Vec<_> = store
        .search_prompts("", &["x".to_string(), "y".to_string()])
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(either, ["p1", "p2", "p4"]);
}

#[test]
fn test_ranker_orders_by_match_quality() {
    let prompts = vec![
        dated("a", "Foo Bar", "", &[], None),
        dated("b", "Bar Foo", "", &[], None),
        dated("c", "Other", "mentions bar", &[], None),
        dated("d", "Nothing", "here", &[], None),
    ];

    let ids: Vec<_> = rank_prompts(&prompts, "bar")
        .into_iter()
        .map(|r| r.prompt.id)
        .collect();
    assert_eq!(ids, ["b", "a", "c"]);
}

#[test]
fn test_import_scenario_reports_invalid_position() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let service = ImportService::new(Arc::clone(&store));

    let json = r#"[
        {"id": "bad", "content": "missing title"},
        {"id": "good", "title": "Good", "content": "Hello {who}"}
    ]"#;
    let result = service.import_json(json, ImportStrategy::Merge).unwrap();

    assert_eq!(result.imported_count, 1);
    assert_eq!(result.duplicates, 0);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("index 0"));

    let reopened = open(&dir);
    let stored = reopened.get_prompt("good").unwrap().unwrap();
    assert_eq!(stored.variables(), ["who"]);
}

#[test]
fn test_export_then_import_json() {
    let source_dir = TempDir::new().unwrap();
    let store = open(&source_dir);
    store
        .create_prompt(NewPrompt::new("Email", "Dear {name}").with_tags(["mail"]))
        .unwrap();
    store.create_prompt(NewPrompt::new("Note", "plain")).unwrap();

    let out = source_dir.path().join("export.json");
    let result = export_to_file(&out, None, &store.get_all_prompts().unwrap()).unwrap();
    assert_eq!(result.exported, 2);
    assert_eq!(result.format, Format::Json);

    let target_dir = TempDir::new().unwrap();
    let target = open(&target_dir);
    let service = ImportService::new(Arc::clone(&target));
    let imported = service.import_file(&out, ImportStrategy::Merge).unwrap();

    assert_eq!(imported.imported_count, 2);
    assert_eq!(target.get_all_prompts().unwrap(), store.get_all_prompts().unwrap());
}

#[test]
fn test_backup_contains_all_collections() {
    let dir = TempDir::new().unwrap();
    let gateway = Arc::new(FilesystemGateway::new(dir.path()).unwrap());
    let store = PromptStore::new(gateway.clone());
    store.create_prompt(NewPrompt::new("P", "p")).unwrap();
    store.create_folder(NewFolder::new("F")).unwrap();
    store.create_tag(NewTag::new("t")).unwrap();

    let name = store.create_backup().unwrap();

    let text = std::fs::read_to_string(gateway.backup_dir().join(&name)).unwrap();
    let backup: BackupDocument = serde_json::from_str(&text).unwrap();
    assert_eq!(backup.version, "1.0");
    assert_eq!(backup.data.prompts.len(), 1);
    assert_eq!(backup.data.folders.len(), 1);
    assert_eq!(backup.data.tags.len(), 1);
}

#[test]
fn test_corrupt_collection_is_an_error() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store.create_prompt(NewPrompt::new("Keep", "me")).unwrap();

    std::fs::write(dir.path().join("prompts.json"), "{ not json").unwrap();

    let reopened = open(&dir);
    assert!(reopened.get_all_prompts().is_err());
    assert!(reopened.create_prompt(NewPrompt::new("New", "x")).is_err());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("prompts.json")).unwrap(),
        "{ not json"
    );
}

#[test]
fn test_settings_persist_and_validate() {
    let dir = TempDir::new().unwrap();
    let gateway = Arc::new(FilesystemGateway::new(dir.path()).unwrap());
    let settings = SettingsService::new(gateway.clone());

    assert!(settings.get().unwrap().global_shortcut.enabled);

    settings
        .set_quick_picker_shortcut("Alt+Space", true)
        .unwrap();
    assert!(settings.set_quick_picker_shortcut("Space", true).is_err());

    let reopened = SettingsService::new(gateway);
    assert_eq!(
        reopened.get().unwrap().global_shortcut.quick_picker,
        "Alt+Space"
    );
}
