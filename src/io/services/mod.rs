//! Import and export orchestration.

mod export;
mod import;

pub use export::{ExportResult, default_export_file_name, export_to_file, export_to_writer};
pub use import::{
    ImportPreview, ImportResult, ImportService, ImportStrategy, ParsedImport, PreviewPrompt,
    parse_document,
};
