//! Import and export of prompt collections.
//!
//! # Supported Formats
//!
//! | Format | Import | Export | Notes |
//! |--------|--------|--------|-------|
//! | JSON | ✓ | ✓ | Array of prompt records |
//! | CSV | - | ✓ | Fixed column order, `;`-joined lists |
//! | Markdown | - | ✓ | One section per prompt |
//!
//! # Examples
//!
//! ```rust,no_run
//! use promptdock::io::{ImportService, ImportStrategy, Format, export_to_file};
//! use promptdock::services::PromptStore;
//! use promptdock::storage::FilesystemGateway;
//! use std::sync::Arc;
//!
//! let store = Arc::new(PromptStore::new(Arc::new(FilesystemGateway::new("/tmp/pd")?)));
//! let service = ImportService::new(store.clone());
//! let result = service.import_file("prompts.json", ImportStrategy::Merge)?;
//! println!("Imported {} prompts", result.imported_count);
//!
//! export_to_file("prompts.csv", Some(Format::Csv), &store.get_all_prompts()?)?;
//! # Ok::<(), promptdock::Error>(())
//! ```

pub mod formats;
pub mod services;

pub use formats::{ExportSink, Format, create_export_sink};
pub use services::{
    ExportResult, ImportPreview, ImportResult, ImportService, ImportStrategy, PreviewPrompt,
    default_export_file_name, export_to_file, export_to_writer, parse_document,
};
