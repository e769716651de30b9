//! Export format adapters.
//!
//! Each format implements [`ExportSink`].

pub mod csv;
pub mod json;
pub mod markdown;

use crate::models::Prompt;
use crate::{Error, Result};
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

/// Destination for exported prompts.
pub trait ExportSink {
    /// Writes one prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be written.
    fn write_prompt(&mut self, prompt: &Prompt) -> Result<()>;

    /// Flushes any buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be flushed.
    fn finalize(self: Box<Self>) -> Result<()>;
}

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Pretty-printed JSON array of prompt records.
    Json,
    /// CSV with a fixed column order.
    Csv,
    /// One Markdown section per prompt.
    Markdown,
}

impl Format {
    /// Returns all formats.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Json, Self::Csv, Self::Markdown]
    }

    /// Returns the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Markdown => "md",
        }
    }

    /// Detects format from file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is not recognized.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("csv") => Ok(Self::Csv),
            Some("md" | "markdown") => Ok(Self::Markdown),
            Some(ext) => Err(Error::InvalidInput(format!(
                "Unsupported file extension: .{ext}"
            ))),
            None => Err(Error::InvalidInput(
                "Cannot determine format: file has no extension".to_string(),
            )),
        }
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "markdown" | "md" => Ok(Self::Markdown),
            _ => Err(Error::InvalidInput(format!("Unknown format: {s}"))),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
            Self::Markdown => write!(f, "markdown"),
        }
    }
}

/// Creates an export sink for the given format and writer.
///
/// # Errors
///
/// Returns an error if sink creation fails.
pub fn create_export_sink<'w, W: Write + 'w>(
    writer: W,
    format: Format,
) -> Result<Box<dyn ExportSink + 'w>> {
    match format {
        Format::Json => Ok(Box::new(json::JsonExportSink::new(writer))),
        Format::Csv => Ok(Box::new(csv::CsvExportSink::new(writer)?)),
        Format::Markdown => Ok(Box::new(markdown::MarkdownExportSink::new(writer))),
    }
}

/// Renders prompts in `format` to a string.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render(prompts: &[Prompt], format: Format) -> Result<String> {
    let mut buffer = Vec::new();
    {
        let mut sink = create_export_sink(&mut buffer, format)?;
        for prompt in prompts {
            sink.write_prompt(prompt)?;
        }
        sink.finalize()?;
    }
    String::from_utf8(buffer).map_err(|e| Error::operation("render_export", e))
}
