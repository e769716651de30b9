//! Markdown export.
//!
//! ````markdown
//! # Prompt Snippets Export
//!
//! ## Title
//!
//! **Description:** ...
//!
//! **Tags:** `a`, `b`
//!
//! **Variables:** `x`
//!
//! **Content:**
//! ```
//! ...
//! ```
//!
//! *Created: 2024-03-01 | Updated: 2024-03-02 | Usage: 3*
//!
//! ---
//! ````

use super::ExportSink;
use crate::models::Prompt;
use crate::{Error, Result};
use std::io::Write;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Markdown export sink.
pub struct MarkdownExportSink<W: Write> {
    writer: W,
    header_written: bool,
}

impl<W: Write> MarkdownExportSink<W> {
    /// Creates a new Markdown export sink.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            header_written: false,
        }
    }

    fn ensure_header(&mut self) -> Result<()> {
        if !self.header_written {
            writeln!(self.writer, "# Prompt Snippets Export\n")
                .map_err(|e| Error::operation("write_markdown", e))?;
            self.header_written = true;
        }
        Ok(())
    }
}

fn code_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("`{item}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders one prompt section.
fn section(prompt: &Prompt) -> String {
    let mut lines = vec![format!("## {}", prompt.title), String::new()];

    if let Some(description) = prompt.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(format!("**Description:** {description}"));
        lines.push(String::new());
    }
    if !prompt.tags.is_empty() {
        lines.push(format!("**Tags:** {}", code_list(&prompt.tags)));
        lines.push(String::new());
    }
    if !prompt.variables().is_empty() {
        lines.push(format!("**Variables:** {}", code_list(prompt.variables())));
        lines.push(String::new());
    }

    lines.push("**Content:**".to_string());
    lines.push("```".to_string());
    lines.push(prompt.content().to_string());
    lines.push("```".to_string());
    lines.push(String::new());
    lines.push(format!(
        "*Created: {} | Updated: {} | Usage: {}*",
        prompt.created_at.format(DATE_FORMAT),
        prompt.updated_at.format(DATE_FORMAT),
        prompt.usage_count
    ));
    lines.push(String::new());
    lines.push("---".to_string());
    lines.push(String::new());

    lines.join("\n")
}

impl<W: Write> ExportSink for MarkdownExportSink<W> {
    fn write_prompt(&mut self, prompt: &Prompt) -> Result<()> {
        self.ensure_header()?;
        writeln!(self.writer, "{}", section(prompt))
            .map_err(|e| Error::operation("write_markdown", e))
    }

    fn finalize(mut self: Box<Self>) -> Result<()> {
        self.ensure_header()?;
        self.writer
            .flush()
            .map_err(|e| Error::operation("flush_markdown", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::formats::{Format, render};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_markdown_section() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let updated = Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap();
        let prompt = Prompt::from_parts(
            "p1",
            "Email",
            "Write a {tone} email",
            Some("Formal mail".to_string()),
            vec!["work".to_string(), "mail".to_string()],
            None,
            3,
            created,
            updated,
        );

        let out = render(&[prompt], Format::Markdown).unwrap();
        let expected = "# Prompt Snippets Export\n\n\
            ## Email\n\n\
            **Description:** Formal mail\n\n\
            **Tags:** `work`, `mail`\n\n\
            **Variables:** `tone`\n\n\
            **Content:**\n```\nWrite a {tone} email\n```\n\n\
            *Created: 2024-03-01 | Updated: 2024-03-02 | Usage: 3*\n\n\
            ---\n\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_markdown_omits_empty_sections() {
        let prompt = Prompt::from_parts(
            "p1", "Plain", "text", Some(String::new()), vec![], None, 0,
            Utc::now(), Utc::now(),
        );
        let out = render(&[prompt], Format::Markdown).unwrap();
        assert!(!out.contains("**Description:**"));
        assert!(!out.contains("**Tags:**"));
        assert!(!out.contains("**Variables:**"));
    }

    #[test]
    fn test_markdown_empty_export_has_header() {
        assert_eq!(
            render(&[], Format::Markdown).unwrap(),
            "# Prompt Snippets Export\n\n"
        );
    }
}
