//! JSON export.
//!
//! Writes prompts as a single pretty-printed array in the same record shape
//! the collection file uses, so an export can be imported again.

use super::ExportSink;
use crate::models::Prompt;
use crate::{Error, Result};
use std::io::Write;

/// JSON export sink.
///
/// Buffers prompts and writes the array on finalize.
pub struct JsonExportSink<W: Write> {
    writer: W,
    prompts: Vec<Prompt>,
}

impl<W: Write> JsonExportSink<W> {
    /// Creates a new JSON export sink.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            prompts: Vec::new(),
        }
    }
}

impl<W: Write> ExportSink for JsonExportSink<W> {
    fn write_prompt(&mut self, prompt: &Prompt) -> Result<()> {
        self.prompts.push(prompt.clone());
        Ok(())
    }

    fn finalize(mut self: Box<Self>) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, &self.prompts)
            .map_err(|e| Error::operation("write_json", e))?;
        self.writer
            .flush()
            .map_err(|e| Error::operation("flush_json", e))
    }
}
