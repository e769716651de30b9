//! Prompt export service.

use crate::io::formats::{Format, create_export_sink};
use crate::models::Prompt;
use crate::{Error, Result};
use chrono::NaiveDate;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Result of an export operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    /// Number of prompts written.
    pub exported: usize,
    /// Format used.
    pub format: Format,
    /// Output path.
    pub path: PathBuf,
}

/// Returns the default export file name, `prompts-export-YYYY-MM-DD.<ext>`.
#[must_use]
pub fn default_export_file_name(format: Format, date: NaiveDate) -> String {
    format!(
        "prompts-export-{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Writes prompts to any writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn export_to_writer<W: Write>(writer: W, format: Format, prompts: &[Prompt]) -> Result<usize> {
    let mut sink = create_export_sink(writer, format)?;
    for prompt in prompts {
        sink.write_prompt(prompt)?;
    }
    sink.finalize()?;
    Ok(prompts.len())
}

/// Writes prompts to a file.
///
/// When `format` is `None` it is detected from the file extension.
///
/// # Errors
///
/// Returns an error if the format cannot be determined or the file cannot be written.
#[instrument(skip(path, prompts), fields(path = %path.as_ref().display(), count = prompts.len()))]
pub fn export_to_file(
    path: impl AsRef<Path>,
    format: Option<Format>,
    prompts: &[Prompt],
) -> Result<ExportResult> {
    let path = path.as_ref();
    let format = match format {
        Some(format) => format,
        None => Format::from_path(path)?,
    };

    let file = std::fs::File::create(path)
        .map_err(|e| Error::operation(format!("create_export_file {}", path.display()), e))?;
    let exported = export_to_writer(BufWriter::new(file), format, prompts)?;

    tracing::info!(exported, %format, "Exported prompts");

    Ok(ExportResult {
        exported,
        format,
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn sample() -> Vec<Prompt> {
        vec![
            Prompt::from_parts("a", "A", "one {x}", None, vec![], None, 0, Utc::now(), Utc::now()),
            Prompt::from_parts("b", "B", "two", None, vec![], None, 1, Utc::now(), Utc::now()),
        ]
    }

    #[test]
    fn test_default_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();
        assert_eq!(
            default_export_file_name(Format::Csv, date),
            "prompts-export-2024-02-09.csv"
        );
        assert_eq!(
            default_export_file_name(Format::Markdown, date),
            "prompts-export-2024-02-09.md"
        );
    }

    #[test]
    fn test_export_detects_format_from_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.md");

        let result = export_to_file(&path, None, &sample()).unwrap();

        assert_eq!(result.exported, 2);
        assert_eq!(result.format, Format::Markdown);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# Prompt Snippets Export"));
        assert!(text.contains("## B"));
    }

    #[test]
    fn test_export_explicit_format_overrides_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");

        let result = export_to_file(&path, Some(Format::Json), &sample()).unwrap();

        assert_eq!(result.format, Format::Json);
        let parsed: Vec<Prompt> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let ids: Vec<_> = parsed.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(parsed[0].variables(), ["x"]);
    }

    #[test]
    fn test_export_unknown_extension_fails() {
        let dir = TempDir::new().unwrap();
        assert!(export_to_file(dir.path().join("out.txt"), None, &sample()).is_err());
    }
}
