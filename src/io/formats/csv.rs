//! CSV export.
//!
//! Columns, in order:
//!
//! `ID, Title, Content, Description, Variables, Tags, Created At, Updated At, Usage Count`
//!
//! Variables and tags are joined with `;`. Fields containing a comma, quote,
//! or newline are quoted with internal quotes doubled.

use super::ExportSink;
use crate::models::Prompt;
use crate::{Error, Result};
use chrono::SecondsFormat;
use std::io::Write;

/// Column headers.
pub const HEADERS: [&str; 9] = [
    "ID",
    "Title",
    "Content",
    "Description",
    "Variables",
    "Tags",
    "Created At",
    "Updated At",
    "Usage Count",
];

/// CSV export sink.
///
/// Writes the header row on creation and one row per prompt.
pub struct CsvExportSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvExportSink<W> {
    /// Creates a new CSV export sink.
    ///
    /// # Errors
    ///
    /// Returns an error if the header row cannot be written.
    pub fn new(writer: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .quote_style(csv::QuoteStyle::Necessary)
            .from_writer(writer);

        writer
            .write_record(HEADERS)
            .map_err(|e| Error::operation("write_csv_headers", e))?;

        Ok(Self { writer })
    }
}

impl<W: Write> ExportSink for CsvExportSink<W> {
    fn write_prompt(&mut self, prompt: &Prompt) -> Result<()> {
        let row = [
            prompt.id.clone(),
            prompt.title.clone(),
            prompt.content().to_string(),
            prompt.description.clone().unwrap_or_default(),
            prompt.variables().join(";"),
            prompt.tags.join(";"),
            prompt.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            prompt.updated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            prompt.usage_count.to_string(),
        ];

        self.writer
            .write_record(&row)
            .map_err(|e| Error::operation("write_csv", e))
    }

    fn finalize(mut self: Box<Self>) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| Error::operation("flush_csv", e))
    }
}
